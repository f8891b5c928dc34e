//! CatalogService unit tests.

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::Utc;
    use exchange_rates::{
        PriceAssembler, RateCache, RateFetchError, RateFetcher, RateSnapshot, RateTable,
    };
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use catalog_types::{
        AppError, Author, AuthorId, AuthorRequest, Book, BookId, BookRequest, CatalogRepository,
        CurrencyCode, DomainError, Money, Page, PageRequest, RepoError, SortKey,
    };

    use crate::CatalogService;

    /// Simple in-memory repository for testing the service layer.
    pub struct MockRepo {
        books: Mutex<HashMap<BookId, Book>>,
        authors: Mutex<HashMap<AuthorId, Author>>,
    }

    impl MockRepo {
        pub fn new() -> Self {
            Self {
                books: Mutex::new(HashMap::new()),
                authors: Mutex::new(HashMap::new()),
            }
        }
    }

    #[async_trait]
    impl CatalogRepository for MockRepo {
        async fn find_book(&self, id: BookId) -> Result<Option<Book>, RepoError> {
            Ok(self.books.lock().unwrap().get(&id).cloned())
        }

        async fn find_books(&self, request: PageRequest) -> Result<Page<Book>, RepoError> {
            let mut books: Vec<Book> = self.books.lock().unwrap().values().cloned().collect();
            books.sort_by(|a, b| a.title.cmp(&b.title));
            let total = books.len();
            let content = books
                .into_iter()
                .skip(request.offset())
                .take(request.size)
                .collect();
            Ok(Page::new(content, request, total))
        }

        async fn save_book(&self, book: Book) -> Result<Book, RepoError> {
            self.books.lock().unwrap().insert(book.id, book.clone());
            Ok(book)
        }

        async fn delete_book(&self, id: BookId) -> Result<(), RepoError> {
            self.books
                .lock()
                .unwrap()
                .remove(&id)
                .map(|_| ())
                .ok_or(RepoError::Domain(DomainError::BookNotFound(id)))
        }

        async fn find_author(&self, id: AuthorId) -> Result<Option<Author>, RepoError> {
            Ok(self.authors.lock().unwrap().get(&id).cloned())
        }

        async fn list_authors(&self) -> Result<Vec<Author>, RepoError> {
            Ok(self.authors.lock().unwrap().values().cloned().collect())
        }

        async fn save_author(&self, author: Author) -> Result<Author, RepoError> {
            self.authors
                .lock()
                .unwrap()
                .insert(author.id, author.clone());
            Ok(author)
        }

        async fn delete_author(&self, id: AuthorId) -> Result<(), RepoError> {
            self.authors
                .lock()
                .unwrap()
                .remove(&id)
                .map(|_| ())
                .ok_or(RepoError::Domain(DomainError::AuthorNotFound(id)))
        }
    }

    /// Rate fetcher returning a fixed outcome and counting calls.
    pub struct StubFetcher {
        outcome: Result<RateTable, RateFetchError>,
        calls: AtomicUsize,
    }

    impl StubFetcher {
        pub fn rates(entries: &[(&str, Decimal)]) -> Arc<Self> {
            let table = entries
                .iter()
                .map(|(code, rate)| (code.parse().unwrap(), *rate))
                .collect();
            Arc::new(Self {
                outcome: Ok(table),
                calls: AtomicUsize::new(0),
            })
        }

        pub fn failing(err: RateFetchError) -> Arc<Self> {
            Arc::new(Self {
                outcome: Err(err),
                calls: AtomicUsize::new(0),
            })
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RateFetcher for StubFetcher {
        async fn fetch(&self) -> Result<RateSnapshot, RateFetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let rates = self.outcome.clone()?;
            Ok(RateSnapshot::new(CurrencyCode::canonical(), Utc::now(), rates))
        }
    }

    fn code(s: &str) -> CurrencyCode {
        s.parse().unwrap()
    }

    fn service_with(fetcher: Arc<StubFetcher>) -> CatalogService<MockRepo> {
        let assembler = PriceAssembler::new(
            RateCache::new(fetcher),
            CurrencyCode::canonical(),
            vec![code("USD"), code("UAH")],
        );
        CatalogService::new(MockRepo::new(), assembler)
    }

    fn default_rates() -> Arc<StubFetcher> {
        StubFetcher::rates(&[("USD", dec!(1.1)), ("UAH", dec!(36.0)), ("GBP", dec!(0.85))])
    }

    fn book_request(title: &str, price: Decimal, author_id: Option<AuthorId>) -> BookRequest {
        BookRequest {
            title: title.into(),
            author_id,
            price: Money::new(price).unwrap(),
        }
    }

    fn author_request(first: &str, last: &str) -> AuthorRequest {
        AuthorRequest {
            first_name: first.into(),
            last_name: last.into(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Book Tests
    // ─────────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_get_book_prices_in_all_currencies() {
        let service = service_with(default_rates());
        let author = service
            .create_author(author_request("Terry", "Pratchett"))
            .await
            .unwrap();
        let created = service
            .create_book(book_request("Mort", dec!(45.0), Some(author.id)))
            .await
            .unwrap();

        let book = service.get_book(created.id, None).await.unwrap();

        assert_eq!(book.author, "Terry Pratchett");
        assert_eq!(book.price.get("EUR").unwrap().amount(), dec!(45.0));
        assert_eq!(book.price.get("USD").unwrap().amount(), dec!(49.50));
        assert_eq!(book.price.get("UAH").unwrap().amount(), dec!(1620.00));
        assert!(!book.price.contains("GBP"));
    }

    #[tokio::test]
    async fn test_get_book_with_currency_override() {
        let service = service_with(default_rates());
        let created = service
            .create_book(book_request("Mort", dec!(10), None))
            .await
            .unwrap();

        let book = service
            .get_book(created.id, Some(vec![code("GBP"), code("JPY")]))
            .await
            .unwrap();

        assert_eq!(book.price.len(), 2);
        assert_eq!(book.price.get("GBP").unwrap().amount(), dec!(8.50));
        assert!(!book.price.contains("USD"));
    }

    #[tokio::test]
    async fn test_missing_book_does_not_touch_rates() {
        let fetcher = default_rates();
        let service = service_with(fetcher.clone());

        let result = service.get_book(BookId::new(), None).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_list_books_uses_one_rate_lookup() {
        let fetcher = default_rates();
        let service = service_with(fetcher.clone());
        for (title, price) in [("A", dec!(1)), ("B", dec!(2)), ("C", dec!(3))] {
            service
                .create_book(book_request(title, price, None))
                .await
                .unwrap();
        }

        let page = service
            .list_books(PageRequest::new(0, 2, SortKey::Title).unwrap(), None)
            .await
            .unwrap();

        assert_eq!(fetcher.calls(), 1);
        assert_eq!(page.content.len(), 2);
        assert_eq!(page.total_elements, 3);
        assert_eq!(page.content[1].price.get("USD").unwrap().amount(), dec!(2.20));
        assert_eq!(page.content[0].author, "Unknown Author");
    }

    #[tokio::test]
    async fn test_empty_page_skips_rate_lookup() {
        let fetcher = StubFetcher::failing(RateFetchError::Status(503));
        let service = service_with(fetcher.clone());

        let page = service
            .list_books(PageRequest::default(), None)
            .await
            .unwrap();

        assert!(page.content.is_empty());
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_rate_failure_is_rate_unavailable() {
        let service = service_with(StubFetcher::failing(RateFetchError::Status(503)));
        let created = service
            .create_book(book_request("Mort", dec!(10), None))
            .await
            .unwrap();

        let single = service.get_book(created.id, None).await;
        let listed = service.list_books(PageRequest::default(), None).await;

        assert!(matches!(single, Err(AppError::RateUnavailable(_))));
        assert!(matches!(listed, Err(AppError::RateUnavailable(_))));
    }

    #[tokio::test]
    async fn test_create_book_answers_with_canonical_price_only() {
        let fetcher = StubFetcher::failing(RateFetchError::Status(503));
        let service = service_with(fetcher.clone());

        let created = service
            .create_book(book_request("Mort", dec!(12.5), None))
            .await
            .unwrap();

        assert_eq!(created.price.len(), 1);
        assert_eq!(created.price.get("EUR").unwrap().amount(), dec!(12.5));
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_create_book_with_unknown_author_fails() {
        let service = service_with(default_rates());

        let result = service
            .create_book(book_request("Mort", dec!(1), Some(AuthorId::new())))
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_create_book_with_empty_title_fails() {
        let service = service_with(default_rates());

        let result = service.create_book(book_request("  ", dec!(1), None)).await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_update_book() {
        let service = service_with(default_rates());
        let created = service
            .create_book(book_request("Mrot", dec!(1), None))
            .await
            .unwrap();

        let updated = service
            .update_book(created.id, book_request("Mort", dec!(2), None))
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "Mort");
        assert_eq!(updated.price.get("EUR").unwrap().amount(), dec!(2));
    }

    #[tokio::test]
    async fn test_update_missing_book_is_not_found() {
        let service = service_with(default_rates());

        let result = service
            .update_book(BookId::new(), book_request("Mort", dec!(1), None))
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_book() {
        let service = service_with(default_rates());
        let created = service
            .create_book(book_request("Mort", dec!(1), None))
            .await
            .unwrap();

        service.delete_book(created.id).await.unwrap();

        assert!(matches!(
            service.delete_book(created.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Author Tests
    // ─────────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_author_crud() {
        let service = service_with(default_rates());

        let created = service
            .create_author(author_request("Ursula", "LeGuin"))
            .await
            .unwrap();
        let updated = service
            .update_author(created.id, author_request("Ursula", "Le Guin"))
            .await
            .unwrap();
        assert_eq!(updated.full_name(), "Ursula Le Guin");
        assert_eq!(service.list_authors().await.unwrap().len(), 1);

        service.delete_author(created.id).await.unwrap();
        assert!(matches!(
            service.get_author(created.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_missing_author_is_not_found() {
        let service = service_with(default_rates());

        let result = service
            .update_author(AuthorId::new(), author_request("A", "B"))
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_current_rates() {
        let service = service_with(default_rates());

        let snapshot = service.current_rates().await.unwrap();

        assert_eq!(snapshot.base().as_str(), "EUR");
        assert_eq!(snapshot.rate(&code("USD")), Some(dec!(1.1)));
    }
}
