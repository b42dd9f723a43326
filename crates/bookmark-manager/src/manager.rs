use async_trait::async_trait;
use bookmark_core::{
    Bookmark, BookmarkId, BookmarkService, Clock, CreateBookmarkRequest, CreatedBookmark,
    LinkPreviewer, LinkValidator, ListPage, ListParams, PatchBookmarkRequest, Preview,
    PreviewError, Repository, ServiceError, StorageError, SystemClock, ValidationErrors,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

type Result<T> = std::result::Result<T, ServiceError>;

/// Context attached to backend failures, reported to clients as is.
pub mod action {
    pub const LIST: &str = "Can't get list of bookmarks";
    pub const CREATE: &str = "Can't create bookmark";
    pub const UPDATE: &str = "Can't update bookmark";
    pub const DELETE: &str = "Can't delete bookmark";
    pub const GET: &str = "Can't get bookmark";
    pub const PREVIEW: &str = "Can't generate bookmark preview";
}

/// The [`BookmarkService`] implementation.
///
/// Wraps a [`Repository`] for persistence and a [`LinkPreviewer`] for
/// previews. Input is validated before the repository is touched, so a
/// rejected request never reaches the store.
pub struct BookmarkManager<R, P, C = SystemClock> {
    repository: Arc<R>,
    previewer: Arc<P>,
    clock: Arc<C>,
    links: LinkValidator,
}

impl<R: Repository, P: LinkPreviewer> BookmarkManager<R, P> {
    /// Creates a manager stamping records with the system clock.
    pub fn new(repository: R, previewer: P, links: LinkValidator) -> Self {
        Self::with_clock(repository, previewer, links, SystemClock)
    }
}

impl<R: Repository, P: LinkPreviewer, C: Clock> BookmarkManager<R, P, C> {
    pub fn with_clock(repository: R, previewer: P, links: LinkValidator, clock: C) -> Self {
        Self {
            repository: Arc::new(repository),
            previewer: Arc::new(previewer),
            clock: Arc::new(clock),
            links,
        }
    }

    fn parse_id(raw: &str) -> Result<BookmarkId> {
        BookmarkId::parse(raw).map_err(|e| {
            debug!(id = raw, "rejected malformed bookmark id");
            ServiceError::from(ValidationErrors::single("id", e))
        })
    }
}

fn storage_error(action: &'static str) -> impl FnOnce(StorageError) -> ServiceError {
    move |source| {
        error!(action, error = %source, "storage operation failed");
        ServiceError::Storage { action, source }
    }
}

fn upstream_error(action: &'static str) -> impl FnOnce(PreviewError) -> ServiceError {
    move |source| {
        warn!(action, error = %source, "preview fetch failed");
        ServiceError::Upstream { action, source }
    }
}

#[async_trait]
impl<R: Repository, P: LinkPreviewer, C: Clock> BookmarkService for BookmarkManager<R, P, C> {
    async fn list(&self, params: ListParams) -> Result<ListPage> {
        let query = params.validate()?;

        let page = self
            .repository
            .list(&query)
            .await
            .map_err(storage_error(action::LIST))?;

        debug!(total = page.total, returned = page.items.len(), "listed bookmarks");
        Ok(page)
    }

    async fn create(&self, request: CreateBookmarkRequest) -> Result<CreatedBookmark> {
        let new = request.validate(&self.links)?;

        let id = BookmarkId::new();
        let created_at = self.clock.now();
        let bookmark = Bookmark::create(id, new, created_at);
        let link = bookmark.link.clone();

        self.repository
            .insert(bookmark)
            .await
            .map_err(storage_error(action::CREATE))?;

        info!(%id, %link, "created bookmark");
        Ok(CreatedBookmark { id, created_at })
    }

    async fn patch(&self, id: &str, request: PatchBookmarkRequest) -> Result<()> {
        let id = Self::parse_id(id)?;
        let patch = request.validate(&self.links)?;

        let updated = self
            .repository
            .update(&id, patch, self.clock.now())
            .await
            .map_err(storage_error(action::UPDATE))?;

        if !updated {
            return Err(ServiceError::NotFound(id));
        }

        info!(%id, "updated bookmark");
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let id = Self::parse_id(id)?;

        let deleted = self
            .repository
            .delete(&id)
            .await
            .map_err(storage_error(action::DELETE))?;

        if !deleted {
            return Err(ServiceError::NotFound(id));
        }

        info!(%id, "deleted bookmark");
        Ok(())
    }

    async fn preview(&self, id: &str) -> Result<Preview> {
        let id = Self::parse_id(id)?;

        let bookmark = self
            .repository
            .get(&id)
            .await
            .map_err(storage_error(action::GET))?
            .ok_or(ServiceError::NotFound(id))?;

        debug!(%id, link = %bookmark.link, "generating preview");
        self.previewer
            .preview(&bookmark.link, &bookmark.description)
            .await
            .map_err(upstream_error(action::PREVIEW))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookmark_core::filter::TimeRange;
    use bookmark_core::repository::ReadRepository;
    use bookmark_core::{BookmarkPatch, ErrorCode, FetchTarget, ListQuery, OpenGraph};
    use bookmark_storage::InMemoryRepository;
    use jiff::{SignedDuration, Timestamp};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Clock returning a fixed instant that tests can move.
    #[derive(Clone)]
    struct FixedClock(Arc<Mutex<Timestamp>>);

    impl FixedClock {
        fn at(raw: &str) -> Self {
            Self(Arc::new(Mutex::new(raw.parse().unwrap())))
        }

        fn advance(&self, by: SignedDuration) {
            let mut now = self.0.lock().unwrap();
            *now = *now + by;
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> Timestamp {
            *self.0.lock().unwrap()
        }
    }

    /// Repository decorator counting every call that reaches the store.
    struct CountingRepository<R> {
        inner: R,
        calls: Arc<AtomicUsize>,
    }

    impl<R> CountingRepository<R> {
        fn new(inner: R, calls: Arc<AtomicUsize>) -> Self {
            Self { inner, calls }
        }

        fn hit(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl<R: Repository> ReadRepository for CountingRepository<R> {
        async fn get(&self, id: &BookmarkId) -> bookmark_core::repository::Result<Option<Bookmark>> {
            self.hit();
            self.inner.get(id).await
        }

        async fn list(&self, query: &ListQuery) -> bookmark_core::repository::Result<ListPage> {
            self.hit();
            self.inner.list(query).await
        }
    }

    #[async_trait]
    impl<R: Repository> Repository for CountingRepository<R> {
        async fn insert(&self, bookmark: Bookmark) -> bookmark_core::repository::Result<()> {
            self.hit();
            self.inner.insert(bookmark).await
        }

        async fn update(
            &self,
            id: &BookmarkId,
            patch: BookmarkPatch,
            updated_at: Timestamp,
        ) -> bookmark_core::repository::Result<bool> {
            self.hit();
            self.inner.update(id, patch, updated_at).await
        }

        async fn delete(&self, id: &BookmarkId) -> bookmark_core::repository::Result<bool> {
            self.hit();
            self.inner.delete(id).await
        }
    }

    /// Previewer echoing its input, or failing when asked to.
    #[derive(Default)]
    struct FakePreviewer {
        fail: bool,
        seen: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl LinkPreviewer for FakePreviewer {
        async fn preview(
            &self,
            link: &str,
            description: &str,
        ) -> std::result::Result<Preview, PreviewError> {
            self.seen
                .lock()
                .unwrap()
                .push((link.to_string(), description.to_string()));

            if self.fail {
                return Err(PreviewError::Status {
                    target: FetchTarget::Whois,
                    status: 502,
                });
            }

            Ok(Preview {
                preview: OpenGraph {
                    kind: "website".to_string(),
                    title: "Title placeholder".to_string(),
                    image: "https://via.placeholder.com/150".to_string(),
                    description: description.to_string(),
                },
                whois: json!({ "link": link }),
            })
        }
    }

    type TestManager =
        BookmarkManager<CountingRepository<InMemoryRepository>, FakePreviewer, FixedClock>;

    struct Harness {
        manager: TestManager,
        calls: Arc<AtomicUsize>,
        clock: FixedClock,
    }

    impl Harness {
        fn new() -> Self {
            Self::with_previewer(FakePreviewer::default())
        }

        fn with_previewer(previewer: FakePreviewer) -> Self {
            let calls = Arc::new(AtomicUsize::new(0));
            let clock = FixedClock::at("2024-03-01T12:00:00Z");
            let manager = BookmarkManager::with_clock(
                CountingRepository::new(InMemoryRepository::new(), Arc::clone(&calls)),
                previewer,
                LinkValidator::default(),
                clock.clone(),
            );
            Self {
                manager,
                calls,
                clock,
            }
        }

        fn store_calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        async fn create(&self, link: &str, favorites: bool) -> CreatedBookmark {
            self.manager
                .create(create_request(link, "a bookmark", Some(favorites)))
                .await
                .unwrap()
        }

        async fn get(&self, id: BookmarkId) -> Bookmark {
            self.manager.repository.inner.get(&id).await.unwrap().unwrap()
        }
    }

    fn create_request(
        link: &str,
        description: &str,
        favorites: Option<bool>,
    ) -> CreateBookmarkRequest {
        CreateBookmarkRequest {
            link: Some(json!(link)),
            description: Some(json!(description)),
            favorites: favorites.map(|f| json!(f)),
        }
    }

    fn validation(err: ServiceError) -> ValidationErrors {
        match err {
            ServiceError::Validation(errors) => errors,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn create_returns_unique_ids_stamped_with_the_clock() {
        let harness = Harness::new();

        let first = harness.create("https://example.com", false).await;
        let second = harness.create("https://example.com", false).await;

        assert_ne!(first.id, second.id);
        assert_eq!(first.created_at, harness.clock.now());

        let stored = harness.get(first.id).await;
        assert_eq!(stored.created_at, first.created_at);
        assert_eq!(stored.updated_at, first.created_at);
        assert!(!stored.favorites);
    }

    #[tokio::test]
    async fn create_defaults_favorites_to_false() {
        let harness = Harness::new();

        let created = harness
            .manager
            .create(create_request("https://example.com", "no flag", None))
            .await
            .unwrap();

        assert!(!harness.get(created.id).await.favorites);
    }

    #[tokio::test]
    async fn blocked_domain_never_reaches_the_store() {
        let harness = Harness::new();

        let err = harness
            .manager
            .create(create_request("https://yahoo.com/news", "blocked", Some(true)))
            .await
            .unwrap_err();

        let errors = validation(err);
        let link = errors.field("link").unwrap();
        assert_eq!(link[0].code, ErrorCode::BlockedDomain);
        assert_eq!(link[0].message, "yahoo.com banned");
        assert_eq!(harness.store_calls(), 0);
    }

    #[tokio::test]
    async fn invalid_create_reports_every_field() {
        let harness = Harness::new();

        let err = harness
            .manager
            .create(CreateBookmarkRequest {
                link: Some(json!("not a link")),
                description: None,
                favorites: Some(json!("yes")),
            })
            .await
            .unwrap_err();

        let errors = validation(err);
        assert!(errors.field("link").is_some());
        assert!(errors.field("description").is_some());
        assert!(errors.field("favorites").is_some());
        assert_eq!(harness.store_calls(), 0);
    }

    #[tokio::test]
    async fn patch_changes_only_supplied_fields_and_advances_updated_at() {
        let harness = Harness::new();
        let created = harness.create("https://example.com", false).await;
        let before = harness.get(created.id).await;

        harness.clock.advance(SignedDuration::from_secs(30));
        harness
            .manager
            .patch(
                &created.id.to_string(),
                PatchBookmarkRequest {
                    favorites: Some(json!(true)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let after = harness.get(created.id).await;
        assert!(after.favorites);
        assert_eq!(after.link, before.link);
        assert_eq!(after.description, before.description);
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at > before.updated_at);
    }

    #[tokio::test]
    async fn patch_on_a_stalled_clock_still_advances_updated_at() {
        let harness = Harness::new();
        let created = harness.create("https://example.com", false).await;

        for _ in 0..2 {
            harness
                .manager
                .patch(&created.id.to_string(), PatchBookmarkRequest::default())
                .await
                .unwrap();
        }

        let after = harness.get(created.id).await;
        assert!(after.updated_at > created.created_at + SignedDuration::from_micros(1));
    }

    #[tokio::test]
    async fn patch_and_delete_of_missing_bookmark_are_not_found() {
        let harness = Harness::new();
        let id = BookmarkId::new().to_string();

        let err = harness
            .manager
            .patch(&id, PatchBookmarkRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        let err = harness.manager.delete(&id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        let err = harness.manager.preview(&id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn malformed_ids_never_reach_the_store() {
        let harness = Harness::new();

        let results = [
            harness
                .manager
                .patch("123", PatchBookmarkRequest::default())
                .await
                .map(|_| ()),
            harness.manager.delete("not-a-guid").await,
            harness
                .manager
                .preview("{0f8fad5b-d9cb-469f-a165-70867728950e}")
                .await
                .map(|_| ()),
        ];

        for result in results {
            let errors = validation(result.unwrap_err());
            assert_eq!(errors.field("id").unwrap()[0].code, ErrorCode::InvalidGuid);
        }
        assert_eq!(harness.store_calls(), 0);
    }

    #[tokio::test]
    async fn delete_removes_the_bookmark() {
        let harness = Harness::new();
        let created = harness.create("https://example.com", false).await;

        harness.manager.delete(&created.id.to_string()).await.unwrap();

        let page = harness.manager.list(ListParams::default()).await.unwrap();
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn list_filters_by_favorites() {
        let harness = Harness::new();
        harness.create("https://a.example.com", true).await;
        harness.create("https://b.example.com", false).await;
        harness.create("https://c.example.com", false).await;

        let favorites = harness
            .manager
            .list(ListParams {
                filter: Some("favorites".to_string()),
                filter_value: Some("true".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(favorites.total, 1);
        assert!(favorites.items.iter().all(|b| b.favorites));

        let others = harness
            .manager
            .list(ListParams {
                filter: Some("favorites".to_string()),
                filter_value: Some("yes".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(others.total, 2);
        assert!(others.items.iter().all(|b| !b.favorites));
    }

    #[tokio::test]
    async fn list_favorites_without_value_is_rejected_before_the_store() {
        let harness = Harness::new();

        let err = harness
            .manager
            .list(ListParams {
                filter: Some("favorites".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();

        let errors = validation(err);
        assert_eq!(
            errors.field("filter_value").unwrap()[0].message,
            "select a filter_value"
        );
        assert_eq!(harness.store_calls(), 0);
    }

    #[tokio::test]
    async fn list_range_includes_both_bounds() {
        let harness = Harness::new();
        let mut created = Vec::new();
        for _ in 0..4 {
            created.push(harness.create("https://example.com", false).await);
            harness.clock.advance(SignedDuration::from_hours(24));
        }

        let range = TimeRange {
            from: created[1].created_at,
            to: created[2].created_at,
        };
        let page = harness
            .manager
            .list(ListParams {
                filter: Some("createdAt".to_string()),
                filter_from: Some(range.from.to_string()),
                filter_to: Some(range.to.to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        let ids: Vec<_> = page.items.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![created[1].id, created[2].id]);
    }

    #[tokio::test]
    async fn list_paginates_and_reports_total() {
        let harness = Harness::new();
        for _ in 0..5 {
            harness.create("https://example.com", false).await;
            harness.clock.advance(SignedDuration::from_secs(1));
        }

        let page = harness
            .manager
            .list(ListParams {
                limit: Some("2".to_string()),
                offset: Some("0".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page.total, 5);
        assert_eq!(page.items.len(), 2);
    }

    #[tokio::test]
    async fn preview_uses_the_stored_link_and_description() {
        let harness = Harness::new();
        let created = harness
            .manager
            .create(create_request("https://example.com/post", "my post", None))
            .await
            .unwrap();

        let preview = harness
            .manager
            .preview(&created.id.to_string())
            .await
            .unwrap();

        assert_eq!(preview.preview.description, "my post");
        assert_eq!(preview.whois, json!({ "link": "https://example.com/post" }));
        assert_eq!(
            *harness.manager.previewer.seen.lock().unwrap(),
            vec![("https://example.com/post".to_string(), "my post".to_string())]
        );
    }

    #[tokio::test]
    async fn preview_failure_is_an_upstream_error() {
        let harness = Harness::with_previewer(FakePreviewer {
            fail: true,
            ..Default::default()
        });
        let created = harness.create("https://example.com", false).await;

        let err = harness
            .manager
            .preview(&created.id.to_string())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Upstream {
                action: action::PREVIEW,
                ..
            }
        ));
    }
}
