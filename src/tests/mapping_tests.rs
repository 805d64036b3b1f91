#[cfg(test)]
mod tests {
    use crate::error::{Entity, ServiceError};
    use crate::mapping::DtoMapper;
    use crate::model::{Drawing, FeedbackValue};
    use crate::repository;
    use crate::tests::fixtures::{self, setup_test_db};
    use crate::types::{FeedbackDto, HistoryDto, RuntimeDto};

    #[tokio::test]
    async fn test_drawing_round_trip() {
        let test_db = setup_test_db().await;
        let mapper = DtoMapper::new(test_db.pool.clone());
        let original = fixtures::drawing(3);

        let dto = mapper.drawing_to_dto(&original);
        let back = mapper.dto_to_drawing(dto).await.unwrap();

        assert_eq!(back, original);
    }

    #[tokio::test]
    async fn test_drawing_round_trip_with_feedbacks() {
        let test_db = setup_test_db().await;
        let mut conn = test_db.pool.acquire().await.unwrap();
        repository::drawing::save(&mut conn, &Drawing::new(3, vec![1])).await.unwrap();
        let h = repository::history::save(&mut conn, &fixtures::history("/q.png")).await.unwrap();
        let mut fb = fixtures::feedback(h.history_id.unwrap(), 3, FeedbackValue::Positive);
        fb.feedback_id = Some(42);
        drop(conn);

        let mapper = DtoMapper::new(test_db.pool.clone());
        let mut original = fixtures::drawing(3);
        original.feedbacks.push(fb);

        let back = mapper.dto_to_drawing(mapper.drawing_to_dto(&original)).await.unwrap();

        // Nested values are copied as given, not reset
        assert_eq!(back.feedbacks[0].feedback_id, Some(42));
        assert_eq!(back.feedbacks[0].feedback_desc.as_deref(), Some("judged Positive"));
        assert_eq!(back, original);
    }

    #[tokio::test]
    async fn test_binary_fields_are_base64() {
        let test_db = setup_test_db().await;
        let mapper = DtoMapper::new(test_db.pool.clone());

        let dto = mapper.drawing_to_dto(&Drawing::new(1, vec![0x01, 0x02]));
        assert_eq!(dto.original_drawing, "AQI=");

        let history = fixtures::history("/q.png");
        assert_eq!(mapper.history_to_dto(&history).query_drawing, "/9j/");
    }

    #[tokio::test]
    async fn test_nested_children_are_linked_to_parent() {
        let test_db = setup_test_db().await;
        let mapper = DtoMapper::new(test_db.pool.clone());
        let mut dto = mapper.drawing_to_dto(&fixtures::drawing(1));
        dto.drawing_id = 8;

        let drawing = mapper.dto_to_drawing(dto).await.unwrap();

        assert!(drawing.runtimes.iter().all(|r| r.drawing_id == 8));
        assert_eq!(drawing.search_data.map(|s| s.drawing_id), Some(8));
    }

    #[tokio::test]
    async fn test_invalid_base64_is_rejected() {
        let test_db = setup_test_db().await;
        let mapper = DtoMapper::new(test_db.pool.clone());
        let mut dto = mapper.drawing_to_dto(&Drawing::new(1, vec![1]));
        dto.original_drawing = "not base64!".to_string();

        let err = mapper.dto_to_drawing(dto).await.unwrap_err();

        assert!(matches!(err, ServiceError::InvalidInput { field: "original_drawing", .. }));
    }

    #[tokio::test]
    async fn test_runtime_with_missing_drawing_fails_fast() {
        let test_db = setup_test_db().await;
        let mapper = DtoMapper::new(test_db.pool.clone());
        let dto = RuntimeDto { runtime_id: 1, drawing_id: 99, machine: "mill".into(), machine_runtime: 1.0 };

        let err = mapper.dto_to_runtime(dto).await.unwrap_err();

        assert!(matches!(err, ServiceError::NotFound { entity: Entity::Drawing, id: 99 }));
    }

    #[tokio::test]
    async fn test_feedback_resolves_drawing_then_history() {
        let test_db = setup_test_db().await;
        let mut conn = test_db.pool.acquire().await.unwrap();
        repository::drawing::save(&mut conn, &Drawing::new(1, vec![1])).await.unwrap();
        drop(conn);
        let mapper = DtoMapper::new(test_db.pool.clone());

        let missing_drawing = FeedbackDto {
            feedback_id: None,
            history_id: 5,
            drawing_id: 2,
            feedback_desc: None,
            feedback_value: 1,
        };
        let err = mapper.dto_to_feedback(missing_drawing.clone()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { entity: Entity::Drawing, id: 2 }));

        let missing_history = FeedbackDto { drawing_id: 1, ..missing_drawing };
        let err = mapper.dto_to_feedback(missing_history).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { entity: Entity::History, id: 5 }));
    }

    #[tokio::test]
    async fn test_feedback_value_out_of_range() {
        let test_db = setup_test_db().await;
        let mut conn = test_db.pool.acquire().await.unwrap();
        repository::drawing::save(&mut conn, &Drawing::new(1, vec![1])).await.unwrap();
        let h = repository::history::save(&mut conn, &fixtures::history("/q.png")).await.unwrap();
        drop(conn);
        let mapper = DtoMapper::new(test_db.pool.clone());

        let dto = FeedbackDto {
            feedback_id: None,
            history_id: h.history_id.unwrap(),
            drawing_id: 1,
            feedback_desc: None,
            feedback_value: 3,
        };
        let err = mapper.dto_to_feedback(dto).await.unwrap_err();

        assert!(matches!(err, ServiceError::InvalidInput { field: "feedback_value", .. }));
    }

    #[tokio::test]
    async fn test_history_without_timestamp_is_stamped() {
        let test_db = setup_test_db().await;
        let mapper = DtoMapper::new(test_db.pool.clone());
        let dto = HistoryDto {
            history_id: None,
            query_drawing: "AQI=".to_string(),
            query_path: Some("/tmp/q.png".to_string()),
            timestamp: None,
            feedbacks: Vec::new(),
        };

        let before = chrono::Utc::now();
        let history = mapper.dto_to_history(dto).await.unwrap();

        assert_eq!(history.query_drawing, vec![1, 2]);
        assert!(history.timestamp >= before);
        assert!(history.history_id.is_none());
    }

    #[tokio::test]
    async fn test_history_round_trip() {
        let test_db = setup_test_db().await;
        let mut conn = test_db.pool.acquire().await.unwrap();
        repository::drawing::save(&mut conn, &Drawing::new(1, vec![1])).await.unwrap();
        let mut h = fixtures::history("/q.png");
        h.add_feedback(fixtures::feedback(0, 1, FeedbackValue::Neutral));
        let saved = repository::history::save(&mut conn, &h).await.unwrap();
        drop(conn);
        let mapper = DtoMapper::new(test_db.pool.clone());

        let back = mapper.dto_to_history(mapper.history_to_dto(&saved)).await.unwrap();

        assert_eq!(back, saved);
    }
}
