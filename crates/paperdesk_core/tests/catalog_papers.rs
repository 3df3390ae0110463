use paperdesk_core::db::open_db_in_memory;
use paperdesk_core::repo::paper_repo::LocalizedText;
use paperdesk_core::{
    CatalogError, CatalogService, ErrorKind, NewPaper, PageRequest, PaperFilter,
    SqlitePaperRepository, SqliteTagRepository,
};
use rusqlite::Connection;

fn catalog(
    conn: &Connection,
) -> CatalogService<SqlitePaperRepository<'_>, SqliteTagRepository<'_>> {
    let papers = SqlitePaperRepository::try_new(conn).unwrap();
    let tags = SqliteTagRepository::try_new(conn).unwrap();
    CatalogService::new(papers, tags)
}

fn new_paper(id: &str, title: &str, category: &str, published: i64) -> NewPaper {
    NewPaper {
        id: Some(id.to_string()),
        title: title.to_string(),
        authors: vec!["Ada Lovelace".to_string()],
        summary: format!("Summary of {title}"),
        categories: vec![category.to_string()],
        published: Some(published),
    }
}

fn first_page() -> PageRequest {
    PageRequest {
        offset: 0,
        limit: 10,
    }
}

#[test]
fn add_paper_fills_defaults_and_reads_back() {
    let conn = open_db_in_memory().unwrap();
    let service = catalog(&conn);

    let added = service
        .add_paper(NewPaper {
            id: None,
            title: "Attention Is All You Need".to_string(),
            authors: vec!["Ashish Vaswani".to_string()],
            summary: "Transformer architecture".to_string(),
            categories: vec!["cs.CL".to_string()],
            published: None,
        })
        .unwrap();

    assert!(!added.id.is_empty());
    assert!(added.published > 0);

    let fetched = service.get_paper(&added.id).unwrap();
    assert_eq!(fetched, added);
}

#[test]
fn add_paper_with_existing_id_is_a_validation_error() {
    let conn = open_db_in_memory().unwrap();
    let service = catalog(&conn);

    service
        .add_paper(new_paper("p1", "First", "cs.LG", 1000))
        .unwrap();
    let err = service
        .add_paper(new_paper("p1", "Second", "cs.LG", 2000))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn get_paper_rejects_blank_id_and_reports_missing_paper() {
    let conn = open_db_in_memory().unwrap();
    let service = catalog(&conn);

    let blank = service.get_paper("  ").unwrap_err();
    assert_eq!(blank.kind(), ErrorKind::Validation);

    let missing = service.get_paper("absent").unwrap_err();
    assert!(matches!(missing, CatalogError::PaperNotFound(ref id) if id == "absent"));
    assert_eq!(missing.kind(), ErrorKind::NotFound);
}

#[test]
fn list_papers_sorts_newest_first_with_stable_ties() {
    let conn = open_db_in_memory().unwrap();
    let service = catalog(&conn);

    service
        .add_paper(new_paper("old", "Old paper", "cs.LG", 1000))
        .unwrap();
    service
        .add_paper(new_paper("tie-a", "Tie A", "cs.LG", 2000))
        .unwrap();
    service
        .add_paper(new_paper("tie-b", "Tie B", "cs.LG", 2000))
        .unwrap();

    let page = service
        .list_papers(&PaperFilter::default(), &first_page())
        .unwrap();
    let ids: Vec<&str> = page.items.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["tie-a", "tie-b", "old"]);
    assert_eq!(page.total, 3);
    assert!(!page.has_more);
}

#[test]
fn category_filter_takes_precedence_over_search() {
    let conn = open_db_in_memory().unwrap();
    let service = catalog(&conn);

    service
        .add_paper(new_paper("lg", "Gradient methods", "cs.LG", 1000))
        .unwrap();
    service
        .add_paper(new_paper("cl", "Gradient parsing", "cs.CL", 2000))
        .unwrap();

    // Search alone matches both titles; the category filter wins.
    let filter = PaperFilter {
        category: Some("cs.LG".to_string()),
        search: Some("gradient".to_string()),
    };
    let page = service.list_papers(&filter, &first_page()).unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, "lg");
}

#[test]
fn search_is_case_insensitive_over_title_authors_and_summary() {
    let conn = open_db_in_memory().unwrap();
    let service = catalog(&conn);

    service
        .add_paper(NewPaper {
            id: Some("target".to_string()),
            title: "Sparse coding".to_string(),
            authors: vec!["Grace Hopper".to_string()],
            summary: "Dictionary learning".to_string(),
            categories: vec!["cs.LG".to_string()],
            published: Some(1000),
        })
        .unwrap();
    service
        .add_paper(new_paper("other", "Unrelated", "cs.LG", 2000))
        .unwrap();

    let filter = PaperFilter {
        category: None,
        search: Some("HOPPER".to_string()),
    };
    let page = service.list_papers(&filter, &first_page()).unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, "target");
}

#[test]
fn pagination_reports_total_and_has_more() {
    let conn = open_db_in_memory().unwrap();
    let service = catalog(&conn);

    for index in 0..5 {
        service
            .add_paper(new_paper(
                &format!("p{index}"),
                &format!("Paper {index}"),
                "cs.LG",
                1000 + index,
            ))
            .unwrap();
    }

    let page = service
        .list_papers(
            &PaperFilter::default(),
            &PageRequest {
                offset: 2,
                limit: 2,
            },
        )
        .unwrap();
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.total, 5);
    assert!(page.has_more);

    let last = service
        .list_papers(
            &PaperFilter::default(),
            &PageRequest {
                offset: 4,
                limit: 2,
            },
        )
        .unwrap();
    assert_eq!(last.items.len(), 1);
    assert!(!last.has_more);
}

#[test]
fn invalid_page_parameters_are_rejected_before_any_read() {
    let conn = open_db_in_memory().unwrap();
    let service = catalog(&conn);

    let negative_offset = service
        .list_papers(
            &PaperFilter::default(),
            &PageRequest {
                offset: -1,
                limit: 10,
            },
        )
        .unwrap_err();
    assert_eq!(negative_offset.kind(), ErrorKind::InvalidQuery);

    let zero_limit = service
        .list_papers(
            &PaperFilter::default(),
            &PageRequest {
                offset: 0,
                limit: 0,
            },
        )
        .unwrap_err();
    assert_eq!(zero_limit.kind(), ErrorKind::InvalidQuery);
}

#[test]
fn read_and_favorite_flags_are_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let service = catalog(&conn);

    service
        .add_paper(new_paper("p1", "Flagged", "cs.LG", 1000))
        .unwrap();

    service.set_read_status("p1", true).unwrap();
    service.set_read_status("p1", true).unwrap();
    service.set_favorite_status("p1", true).unwrap();
    service.set_favorite_status("p1", true).unwrap();

    assert_eq!(service.list_read_papers().unwrap(), vec!["p1".to_string()]);
    assert_eq!(
        service.list_favorite_papers().unwrap(),
        vec!["p1".to_string()]
    );

    service.set_read_status("p1", false).unwrap();
    assert!(service.list_read_papers().unwrap().is_empty());
    assert_eq!(
        service.list_favorite_papers().unwrap(),
        vec!["p1".to_string()]
    );
}

#[test]
fn status_update_for_missing_paper_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = catalog(&conn);

    let err = service.set_read_status("absent", true).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = service.set_favorite_status("absent", true).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn localized_fulltext_distinguishes_missing_paper_from_missing_text() {
    let conn = open_db_in_memory().unwrap();
    let service = catalog(&conn);

    service
        .add_paper(new_paper("p1", "Untranslated", "cs.LG", 1000))
        .unwrap();

    let missing = service.localized_fulltext("absent").unwrap_err();
    assert_eq!(missing.kind(), ErrorKind::NotFound);

    // Existing paper without a stored translation yields empty text, not an
    // error.
    assert_eq!(service.localized_fulltext("p1").unwrap(), "");
}

#[test]
fn set_localization_writes_back_and_keeps_omitted_fields() {
    let conn = open_db_in_memory().unwrap();
    let service = catalog(&conn);

    service
        .add_paper(new_paper("p1", "Translated", "cs.LG", 1000))
        .unwrap();

    service
        .set_localization(
            "p1",
            &LocalizedText {
                title: Some("Titre".to_string()),
                summary: Some("Sommaire".to_string()),
                fulltext: Some("Texte complet".to_string()),
            },
        )
        .unwrap();
    assert_eq!(service.localized_fulltext("p1").unwrap(), "Texte complet");

    // Partial writeback keeps the previously stored fulltext.
    service
        .set_localization(
            "p1",
            &LocalizedText {
                title: Some("Nouveau titre".to_string()),
                summary: None,
                fulltext: None,
            },
        )
        .unwrap();
    assert_eq!(service.localized_fulltext("p1").unwrap(), "Texte complet");

    let paper = service.get_paper("p1").unwrap();
    assert_eq!(paper.title_localized.as_deref(), Some("Nouveau titre"));
    assert_eq!(paper.summary_localized.as_deref(), Some("Sommaire"));

    let err = service
        .set_localization("absent", &LocalizedText::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
