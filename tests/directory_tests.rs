//! Directory projection and live view tests
//!
//! The projection tests run on in-memory fixtures. The view tests go through
//! the real service and notifier, and are serialized because they share a
//! global test pool.

use chrono::{Duration, TimeZone, Utc};
use di::{Injectable, Ref, ServiceCollection};
use serial_test::serial;
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicU32, Ordering};
use support_chat_admin::core::directory::{
    ChatFilter, ChatSort, DateRange, DirectoryPage, DirectoryQuery, SortField, SortOrder,
    select_page,
};
use support_chat_admin::core::notify::ChangeNotifier;
use support_chat_admin::core::services::HandoffChatService;
use support_chat_admin::core::traits::ChatService;
use support_chat_admin::core::views::{DirectoryView, ThreadView};
use support_chat_admin::infrastructure::database::DatabaseConnection;
use support_chat_admin::infrastructure::entities::{ChatSummary, NewChat};
use support_chat_admin::infrastructure::error::StoreError;
use support_chat_admin::infrastructure::repositories::DbChatRepository;

fn base_time() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

fn summary(
    id: i64,
    waiting: bool,
    ai: bool,
    hours_ago: Option<i64>,
    message_count: i64,
) -> ChatSummary {
    ChatSummary {
        id,
        uuid: format!("chat-{id:04}"),
        waiting,
        ai,
        read: false,
        last_message_at: hours_ago.map(|h| base_time() - Duration::hours(h)),
        message_count,
    }
}

/// 25 chats, most recently active first under the default sort
fn paging_fixture() -> Vec<ChatSummary> {
    (1..=25)
        .map(|id| summary(id, false, true, Some(25 - id), id))
        .collect()
}

fn ids(page: &DirectoryPage) -> Vec<i64> {
    page.items.iter().map(|c| c.id).collect()
}

#[test]
fn test_default_query_takes_ten_most_recent() {
    let chats = paging_fixture();

    let page = select_page(&chats, &DirectoryQuery::default());

    assert_eq!(page.total, 25);
    assert_eq!(ids(&page), (16..=25).rev().collect::<Vec<i64>>());
}

#[test]
fn test_second_page_continues_where_first_ended() {
    let chats = paging_fixture();
    let query = DirectoryQuery {
        page: 2,
        ..DirectoryQuery::default()
    };

    let page = select_page(&chats, &query);

    assert_eq!(page.total, 25);
    assert_eq!(ids(&page), (6..=15).rev().collect::<Vec<i64>>());
}

#[test]
fn test_last_page_is_short_and_past_end_is_empty() {
    let chats = paging_fixture();

    let page = select_page(
        &chats,
        &DirectoryQuery {
            page: 3,
            ..DirectoryQuery::default()
        },
    );
    assert_eq!(ids(&page), vec![5, 4, 3, 2, 1]);

    let past_end = select_page(
        &chats,
        &DirectoryQuery {
            page: 9,
            ..DirectoryQuery::default()
        },
    );
    assert!(past_end.items.is_empty());
    assert_eq!(past_end.total, 25);
}

#[test]
fn test_flag_filters_and_filtered_total() {
    let chats = vec![
        summary(1, true, true, Some(1), 2),
        summary(2, true, false, Some(2), 2),
        summary(3, false, true, Some(3), 2),
        summary(4, true, true, Some(4), 2),
    ];

    let query = DirectoryQuery {
        filter: ChatFilter {
            waiting: Some(true),
            ai: Some(true),
            date_range: None,
        },
        ..DirectoryQuery::default()
    };
    let page = select_page(&chats, &query);

    // Total counts what matched the filter, not the whole directory
    assert_eq!(page.total, 2);
    assert_eq!(ids(&page), vec![1, 4]);
}

#[test]
fn test_date_range_bounds_apply_independently() {
    let chats = vec![
        summary(1, false, true, Some(2), 1),
        summary(2, false, true, Some(5), 1),
        summary(3, false, true, None, 0),
        summary(4, false, true, Some(0), 1),
    ];

    let bounded = |range: DateRange| DirectoryQuery {
        filter: ChatFilter {
            waiting: None,
            ai: None,
            date_range: Some(range),
        },
        ..DirectoryQuery::default()
    };

    // Window: between three hours ago and one hour ago
    let page = select_page(
        &chats,
        &bounded(DateRange {
            start: Some(base_time() - Duration::hours(3)),
            end: Some(base_time() - Duration::hours(1)),
        }),
    );
    assert_eq!(ids(&page), vec![1]);

    // Open-ended after: the quiet chat still has no activity to compare
    let page = select_page(
        &chats,
        &bounded(DateRange {
            start: Some(base_time() - Duration::hours(3)),
            end: None,
        }),
    );
    assert_eq!(page.total, 2);
    assert_eq!(ids(&page), vec![4, 1]);

    // Open-ended before
    let page = select_page(
        &chats,
        &bounded(DateRange {
            start: None,
            end: Some(base_time() - Duration::hours(4)),
        }),
    );
    assert_eq!(ids(&page), vec![2]);
}

#[test]
fn test_sort_by_message_count_both_ways() {
    let chats = vec![
        summary(1, false, true, Some(1), 7),
        summary(2, false, true, Some(2), 3),
        summary(3, false, true, Some(3), 12),
    ];

    let sorted = |order: SortOrder| DirectoryQuery {
        sort: ChatSort {
            field: SortField::MessageCount,
            order,
        },
        ..DirectoryQuery::default()
    };

    let page = select_page(&chats, &sorted(SortOrder::Asc));
    assert_eq!(ids(&page), vec![2, 1, 3]);

    let page = select_page(&chats, &sorted(SortOrder::Desc));
    assert_eq!(ids(&page), vec![3, 1, 2]);
}

#[test]
fn test_sort_by_uuid_is_lexicographic() {
    let mut chats = vec![
        summary(1, false, true, Some(1), 1),
        summary(2, false, true, Some(2), 1),
        summary(3, false, true, Some(3), 1),
    ];
    chats[0].uuid = "chat-zulu".to_owned();
    chats[1].uuid = "chat-alpha".to_owned();
    chats[2].uuid = "chat-mike".to_owned();

    let query = DirectoryQuery {
        sort: ChatSort {
            field: SortField::Uuid,
            order: SortOrder::Asc,
        },
        ..DirectoryQuery::default()
    };
    let page = select_page(&chats, &query);

    assert_eq!(ids(&page), vec![2, 3, 1]);
}

#[test]
fn test_quiet_chats_sort_before_any_activity_ascending() {
    let chats = vec![
        summary(1, false, true, Some(1), 1),
        summary(2, false, true, None, 0),
        summary(3, false, true, Some(30), 1),
    ];

    let sorted = |order: SortOrder| DirectoryQuery {
        sort: ChatSort {
            field: SortField::LastMessageAt,
            order,
        },
        ..DirectoryQuery::default()
    };

    let page = select_page(&chats, &sorted(SortOrder::Asc));
    assert_eq!(ids(&page), vec![2, 3, 1]);

    // And last descending, matching the store's NULLS LAST listing
    let page = select_page(&chats, &sorted(SortOrder::Desc));
    assert_eq!(ids(&page), vec![1, 3, 2]);
}

#[test]
fn test_ties_keep_their_directory_order() {
    let chats = vec![
        summary(1, false, true, Some(1), 5),
        summary(2, false, true, Some(2), 5),
        summary(3, false, true, Some(3), 5),
    ];

    let sorted = |order: SortOrder| DirectoryQuery {
        sort: ChatSort {
            field: SortField::MessageCount,
            order,
        },
        ..DirectoryQuery::default()
    };

    // The sort is stable, so a tie never reorders
    let page = select_page(&chats, &sorted(SortOrder::Asc));
    assert_eq!(ids(&page), vec![1, 2, 3]);
    let page = select_page(&chats, &sorted(SortOrder::Desc));
    assert_eq!(ids(&page), vec![1, 2, 3]);
}

// ---------------------------------------------------------------------------
// Live view tests, on the real store
// ---------------------------------------------------------------------------

/// Counter for unique test database URIs
static TEST_DB_COUNTER: AtomicU32 = AtomicU32::new(0);

async fn setup_test_db() -> SqlitePool {
    let db_num = TEST_DB_COUNTER.fetch_add(1, Ordering::SeqCst);
    let db_url = format!("sqlite:file:viewtestdb{}?mode=memory&cache=shared", db_num);

    let pool = SqlitePool::connect(&db_url).await.unwrap();
    sqlx::migrate!().run(&pool).await.unwrap();

    DatabaseConnection::set_test_pool(pool.clone());
    DatabaseConnection::create()
        .ensure_read_column()
        .await
        .unwrap();

    pool
}

fn cleanup_test_db() {
    DatabaseConnection::clear_test_pool();
}

/// Service and notifier wired together the same way the server wires them
fn create_store() -> (Ref<dyn ChatService>, Ref<ChangeNotifier>) {
    let provider = ServiceCollection::new()
        .add(DatabaseConnection::transient())
        .add(ChangeNotifier::singleton())
        .add(DbChatRepository::scoped())
        .add(HandoffChatService::scoped())
        .build_provider()
        .unwrap();

    let service = provider.get_required::<dyn ChatService>();
    let notifier = provider.get_required::<ChangeNotifier>();
    notifier.open();
    (service, notifier)
}

fn new_chat(uuid: &str) -> NewChat {
    NewChat {
        uuid: Some(uuid.to_owned()),
        waiting: Some(false),
        ai: Some(true),
    }
}

#[tokio::test]
#[serial]
async fn test_directory_view_converges_after_poll() {
    let _pool = setup_test_db().await;
    let (service, notifier) = create_store();

    let mut view = DirectoryView::open(
        Ref::clone(&service),
        Ref::clone(&notifier),
        DirectoryQuery::default(),
    );

    // A new view materializes on its first refresh
    assert!(view.refresh_if_stale().await.unwrap());
    assert_eq!(view.current().total, 0);

    service.create_chat(new_chat("chat-v1")).await.unwrap();

    // The change is parked until the next poll, the view still shows the
    // page it last committed to
    assert!(!view.refresh_if_stale().await.unwrap());
    assert_eq!(view.current().total, 0);

    notifier.poll_now();
    assert!(view.is_stale());
    assert!(view.refresh_if_stale().await.unwrap());
    assert_eq!(view.current().total, 1);
    assert_eq!(view.current().items[0].uuid, "chat-v1");

    cleanup_test_db();
}

#[tokio::test]
#[serial]
async fn test_directory_view_set_query_uses_cached_list() {
    let _pool = setup_test_db().await;
    let (service, notifier) = create_store();

    for n in 0..12 {
        service
            .create_chat(new_chat(&format!("chat-q{n:02}")))
            .await
            .unwrap();
    }

    let mut view = DirectoryView::open(
        Ref::clone(&service),
        Ref::clone(&notifier),
        DirectoryQuery::default(),
    );
    view.refresh().await.unwrap();
    assert_eq!(view.current().items.len(), 10);
    assert_eq!(view.current().total, 12);

    // Paging forward is a local re-projection, no store round trip
    view.set_query(DirectoryQuery {
        page: 2,
        ..DirectoryQuery::default()
    });
    assert_eq!(view.current().items.len(), 2);
    assert_eq!(view.current().total, 12);
    assert!(!view.is_stale());

    cleanup_test_db();
}

#[tokio::test]
#[serial]
async fn test_closed_directory_view_stops_listening() {
    let _pool = setup_test_db().await;
    let (service, notifier) = create_store();

    let mut view = DirectoryView::open(
        Ref::clone(&service),
        Ref::clone(&notifier),
        DirectoryQuery::default(),
    );
    view.refresh().await.unwrap();
    view.close();

    service.create_chat(new_chat("chat-unseen")).await.unwrap();
    notifier.poll_now();

    assert!(!view.is_stale());

    cleanup_test_db();
}

#[tokio::test]
#[serial]
async fn test_thread_view_tracks_only_its_chat() {
    let _pool = setup_test_db().await;
    let (service, notifier) = create_store();

    let watched = service.create_chat(new_chat("chat-watched")).await.unwrap();
    let other = service.create_chat(new_chat("chat-other")).await.unwrap();

    let mut view = ThreadView::open(Ref::clone(&service), Ref::clone(&notifier), watched.id);
    view.refresh().await.unwrap();
    assert_eq!(view.messages().len(), 0);

    // Traffic in another thread does not disturb this view
    service
        .customer_message_arrives(other.id, "Unrelated question".to_owned())
        .await
        .unwrap();
    notifier.poll_now();
    assert!(!view.is_stale());

    service
        .customer_message_arrives(watched.id, "Is anyone there?".to_owned())
        .await
        .unwrap();
    notifier.poll_now();
    assert!(view.is_stale());

    view.refresh_if_stale().await.unwrap();
    assert_eq!(view.messages().len(), 1);
    assert_eq!(view.messages()[0].message, "Is anyone there?");
    assert!(view.chat().unwrap().waiting);

    cleanup_test_db();
}

#[tokio::test]
#[serial]
async fn test_thread_view_sees_flag_changes() {
    let _pool = setup_test_db().await;
    let (service, notifier) = create_store();

    let chat = service.create_chat(new_chat("chat-flags")).await.unwrap();

    let mut view = ThreadView::open(Ref::clone(&service), Ref::clone(&notifier), chat.id);
    view.refresh().await.unwrap();
    assert!(view.chat().unwrap().ai);

    service.take_over(chat.id).await.unwrap();
    notifier.poll_now();

    assert!(view.refresh_if_stale().await.unwrap());
    let current = view.chat().unwrap();
    assert!(current.waiting);
    assert!(!current.ai);

    cleanup_test_db();
}

#[tokio::test]
#[serial]
async fn test_thread_view_search() {
    let _pool = setup_test_db().await;
    let (service, notifier) = create_store();

    let chat = service.create_chat(new_chat("chat-search")).await.unwrap();
    service
        .customer_message_arrives(chat.id, "Where is my REFUND?".to_owned())
        .await
        .unwrap();
    service
        .responder_replies(chat.id, "Your refund was issued yesterday.".to_owned())
        .await
        .unwrap();
    service
        .customer_message_arrives(chat.id, "Thanks, found it.".to_owned())
        .await
        .unwrap();

    let mut view = ThreadView::open(Ref::clone(&service), Ref::clone(&notifier), chat.id);
    view.refresh().await.unwrap();

    let hits = view.search("refund");
    assert_eq!(hits.len(), 2);

    // Whitespace is trimmed off the term first
    let hits = view.search("  refund  ");
    assert_eq!(hits.len(), 2);

    // A blank term matches the whole thread
    let hits = view.search("   ");
    assert_eq!(hits.len(), 3);

    let hits = view.search("warranty");
    assert!(hits.is_empty());

    cleanup_test_db();
}

#[tokio::test]
#[serial]
async fn test_view_refresh_failure_leaves_it_stale() {
    let _pool = setup_test_db().await;
    let (service, notifier) = create_store();

    let mut view = ThreadView::open(Ref::clone(&service), Ref::clone(&notifier), 999);

    let err = view.refresh_if_stale().await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound));
    // Still stale, so the next cycle tries again
    assert!(view.is_stale());

    cleanup_test_db();
}
