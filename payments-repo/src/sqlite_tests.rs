//! SQLite repository integration tests.

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use payments_types::{
        Currency, Money, Payment, PaymentDraft, PaymentId, PaymentMethod, PaymentRepository,
        PaymentStatus, RepoError,
    };
    use rust_decimal_macros::dec;

    use crate::SqliteRepo;

    async fn setup_repo() -> SqliteRepo {
        SqliteRepo::new("sqlite::memory:").await.unwrap()
    }

    fn pending(provider: &str) -> Payment {
        Payment::pending(PaymentDraft {
            amount: Money::new(dec!(100.50), Currency::BRL).unwrap(),
            method: PaymentMethod::CreditCard,
            provider: provider.to_string(),
        })
    }

    #[tokio::test]
    async fn test_create_and_read_back_identical() {
        let repo = setup_repo().await;
        let payment = pending("Stripe");

        let id = repo.create(&payment).await.unwrap();
        let first = repo.find_by_id(id).await.unwrap().unwrap();
        let second = repo.find_by_id(id).await.unwrap().unwrap();

        assert_eq!(first, payment);
        assert_eq!(first, second);
        assert_eq!(first.amount.amount(), dec!(100.50));
    }

    #[tokio::test]
    async fn test_find_missing_payment() {
        let repo = setup_repo().await;

        let result = repo.find_by_id(PaymentId::new()).await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_create_conflicts() {
        let repo = setup_repo().await;
        let payment = pending("Stripe");

        repo.create(&payment).await.unwrap();
        let result = repo.create(&payment).await;

        assert!(matches!(result, Err(RepoError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_approve_persists_reference() {
        let repo = setup_repo().await;
        let mut payment = pending("Stripe");
        repo.create(&payment).await.unwrap();

        payment.approve("ch_abc123").unwrap();
        repo.update_status(payment.id, &payment.status_update())
            .await
            .unwrap();

        let stored = repo.find_by_id(payment.id).await.unwrap().unwrap();
        assert_eq!(stored.status, PaymentStatus::Approved);
        assert_eq!(stored.provider_reference.as_deref(), Some("ch_abc123"));
        assert_eq!(stored.failure_reason, None);
        assert_eq!(stored, payment);
    }

    #[tokio::test]
    async fn test_terminal_status_is_final() {
        let repo = setup_repo().await;
        let mut payment = pending("Paypal");
        repo.create(&payment).await.unwrap();

        payment.fail("INSTRUMENT_DECLINED").unwrap();
        repo.update_status(payment.id, &payment.status_update())
            .await
            .unwrap();

        let mut approved = payment.clone();
        approved.status = PaymentStatus::Approved;
        approved.provider_reference = Some("PAY-1".into());
        let result = repo
            .update_status(payment.id, &approved.status_update())
            .await;

        assert!(matches!(result, Err(RepoError::Conflict(_))));
        let stored = repo.find_by_id(payment.id).await.unwrap().unwrap();
        assert_eq!(stored.status, PaymentStatus::Failed);
    }

    #[tokio::test]
    async fn test_update_unknown_payment() {
        let repo = setup_repo().await;
        let mut payment = pending("Stripe");
        payment.fail("card_declined").unwrap();

        let result = repo
            .update_status(payment.id, &payment.status_update())
            .await;

        assert!(matches!(result, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn test_update_back_to_pending_rejected() {
        let repo = setup_repo().await;
        let payment = pending("Stripe");
        repo.create(&payment).await.unwrap();

        let result = repo
            .update_status(payment.id, &payment.status_update())
            .await;

        assert!(matches!(result, Err(RepoError::Domain(_))));
    }

    #[tokio::test]
    async fn test_list_stale_pending() {
        let repo = setup_repo().await;

        let mut stale = pending("Stripe");
        stale.created_at -= Duration::minutes(20);
        stale.updated_at = stale.created_at;
        let fresh = pending("Stripe");
        let mut resolved = pending("Paypal");
        resolved.created_at -= Duration::minutes(40);
        resolved.approve("PAY-2").unwrap();

        for p in [&stale, &fresh, &resolved] {
            repo.create(p).await.unwrap();
        }

        let found = repo
            .list_stale_pending(Utc::now() - Duration::minutes(5), 50)
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, stale.id);
    }
}
