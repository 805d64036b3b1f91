#[cfg(test)]
mod tests {
    use crate::error::{AppError, AppResult, Entity, OptionExt, ServiceError};
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use http_body_util::BodyExt;
    use serde_json::Value;

    async fn body_json(error: AppError) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_app_error_display() {
        let error = AppError::BadRequest("Invalid input".to_string());
        assert_eq!(format!("{}", error), "Bad request: Invalid input");

        let error = AppError::NotFound("Resource not found".to_string());
        assert_eq!(format!("{}", error), "Not found: Resource not found");

        let error = AppError::ValidationError { field: "feedback_value".into(), message: "bad".into() };
        assert_eq!(format!("{}", error), "Validation error on field 'feedback_value': bad");
    }

    #[test]
    fn test_not_found_messages() {
        let cases = [
            (Entity::Drawing, "Unable to find Drawing with id 1"),
            (Entity::History, "Unable to find History with id 1"),
            (Entity::Runtime, "Could not find runtime with id 1"),
            (Entity::SearchData, "Could not find search data with id 1"),
            (Entity::Feedback, "Could not find feedback with id 1"),
        ];
        for (entity, expected) in cases {
            assert_eq!(ServiceError::not_found(entity, 1).to_string(), expected);
        }
    }

    #[test]
    fn test_not_found_for_parent_messages() {
        let error = ServiceError::NotFoundForParent { entity: Entity::Runtime, parent: Entity::Drawing, id: 4 };
        assert_eq!(error.to_string(), "Could not find runtimes for drawing with id 4");

        let error = ServiceError::NotFoundForParent { entity: Entity::Feedback, parent: Entity::History, id: 4 };
        assert_eq!(error.to_string(), "Could not find feedbacks for history with id 4");
        assert!(matches!(AppError::from(error), AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_service_error_status_mapping() {
        let (status, body) = body_json(ServiceError::not_found(Entity::Runtime, 8).into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["message"], "Could not find runtime with id 8");

        let invalid = ServiceError::InvalidInput { field: "query_drawing", message: "not valid base64".into() };
        let (status, body) = body_json(invalid.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["details"]["message"], "not valid base64");

        let (status, body) = body_json(ServiceError::Storage(sqlx::Error::PoolClosed).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "DATABASE_ERROR");
        assert!(body["error"]["details"]["error_id"].is_string());
    }

    #[tokio::test]
    async fn test_error_envelope_shape() {
        let (status, body) = body_json(AppError::ServiceUnavailable("Service down".into())).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], 503);
        assert!(body["timestamp"].is_string());
        assert!(body["error"].get("details").is_none());
    }

    #[test]
    fn test_from_sqlx_error() {
        match AppError::from(sqlx::Error::RowNotFound) {
            AppError::NotFound(_) => {}
            other => panic!("Expected NotFound variant, got {:?}", other),
        }
        match AppError::from(sqlx::Error::PoolTimedOut) {
            AppError::ServiceUnavailable(_) => {}
            other => panic!("Expected ServiceUnavailable variant, got {:?}", other),
        }
    }

    #[test]
    fn test_storage_error_is_not_not_found() {
        let error = ServiceError::from(sqlx::Error::PoolClosed);
        assert!(matches!(error, ServiceError::Storage(_)));
        assert!(matches!(AppError::from(error), AppError::Database(_)));
    }

    #[test]
    fn test_option_ext() {
        let some: Option<i32> = Some(42);
        let result: AppResult<i32> = some.ok_or_not_found(Entity::Feedback, 1);
        assert_eq!(result.unwrap(), 42);

        let none: Option<i32> = None;
        match none.ok_or_not_found(Entity::Feedback, 2) {
            Err(AppError::NotFound(msg)) => assert_eq!(msg, "Could not find feedback with id 2"),
            _ => panic!("Expected NotFound error"),
        }
    }
}
