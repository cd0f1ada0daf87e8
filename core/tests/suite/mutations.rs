use homeinspect_core::LookupError;
use homeinspect_core::StoreError;
use homeinspect_core::StoreEvent;
use pretty_assertions::assert_eq;
use wiremock::MockServer;

use super::mock_backend::ready_store;

#[tokio::test]
async fn add_and_remove_reuse_ids_and_reset_links() {
    let server = MockServer::start().await;
    let store = ready_store(&server).await;

    let first = store.add_result(1).unwrap();
    let second = store.add_result(2).unwrap();
    assert_eq!((first, second), (0, 1));
    assert_eq!(store.comment(1).unwrap().result_id, Some(first));

    assert_eq!(store.remove_result(first).unwrap(), 1);
    assert_eq!(store.comment(1).unwrap().result_id, None);
    assert!(matches!(
        store.result(first),
        Err(StoreError::Lookup(LookupError::Result(0)))
    ));

    let reused = store.add_result(2).unwrap();
    assert_eq!(reused, first);
    assert_eq!(store.comment(2).unwrap().result_id, Some(reused));
    assert_eq!(store.counts().unwrap().live_results, 2);
}

#[tokio::test]
async fn mutations_emit_events_in_order() {
    let server = MockServer::start().await;
    let store = ready_store(&server).await;
    let mut events = store.subscribe();

    let id = store.add_result(2).unwrap();
    store.change_severity(id).unwrap();
    store.change_note(id, "Replace flashing").unwrap();
    store.change_photo(id, "/tmp/roof.jpg").unwrap();
    store.change_flags(id, vec![2]).unwrap();
    store.remove_result(id).unwrap();

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    assert_eq!(
        seen,
        vec![
            StoreEvent::ResultAdded {
                result_id: id,
                comment_id: 2,
            },
            StoreEvent::SeverityChanged {
                result_id: id,
                severity: 2,
            },
            StoreEvent::NoteChanged { result_id: id },
            StoreEvent::PhotoChanged { result_id: id },
            StoreEvent::FlagsChanged { result_id: id },
            StoreEvent::ResultRemoved {
                result_id: id,
                comment_id: 2,
            },
        ]
    );
}

#[tokio::test]
async fn failed_mutations_emit_nothing() {
    let server = MockServer::start().await;
    let store = ready_store(&server).await;
    let mut events = store.subscribe();

    assert!(matches!(
        store.add_result(77),
        Err(StoreError::Lookup(LookupError::Comment(77)))
    ));
    assert!(matches!(
        store.change_severity(3),
        Err(StoreError::Lookup(LookupError::Result(3)))
    ));
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn severity_toggles_and_setters_persist() {
    let server = MockServer::start().await;
    let store = ready_store(&server).await;
    let id = store.add_result(1).unwrap();

    assert_eq!(store.result(id).unwrap().severity, 1);
    assert_eq!(store.change_severity(id).unwrap(), 2);
    assert_eq!(store.change_severity(id).unwrap(), 1);

    store.change_note(id, "Moss removal advised").unwrap();
    let result = store.result(id).unwrap();
    assert_eq!(result.note, "Moss removal advised");
    assert_eq!(result.inspection_id, -1);
}

#[tokio::test]
async fn position_queries_follow_display_order() {
    let server = MockServer::start().await;
    let store = ready_store(&server).await;

    assert_eq!(store.subsection_text(0, 0).unwrap(), "Roof");
    assert_eq!(store.subsection_text(0, 5).unwrap(), "Not Found");
    assert_eq!(store.comment_id(0, 0, 1).unwrap(), Some(2));
    assert_eq!(store.comment_id(0, 0, 2).unwrap(), None);
    assert_eq!(
        store.comment_text(9).unwrap(),
        "Error getting text for comment: Id 9 out of range (3)"
    );
    assert!(matches!(
        store.lookup_comment_text(9),
        Err(StoreError::Lookup(LookupError::Comment(9)))
    ));
    assert_eq!(store.section_at(0).unwrap().name.as_deref(), Some("Exterior"));
    assert!(matches!(
        store.section_at(1),
        Err(StoreError::Lookup(LookupError::SectionPosition(1)))
    ));
}
