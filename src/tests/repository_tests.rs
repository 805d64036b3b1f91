#[cfg(test)]
mod tests {
    use crate::model::{Drawing, FeedbackValue};
    use crate::repository::{drawing, feedback, history, runtime, search_data};
    use crate::tests::fixtures::{self, setup_test_db};

    #[tokio::test]
    async fn test_drawing_save_cascades_children() {
        let test_db = setup_test_db().await;
        let mut conn = test_db.pool.acquire().await.unwrap();

        let saved = drawing::save(&mut conn, &fixtures::drawing(1)).await.unwrap();

        assert_eq!(saved.runtimes.len(), 2);
        assert_eq!(saved.search_data, Some(fixtures::search_data(100, 1)));
        assert_eq!(runtime::count(&mut conn).await.unwrap(), 2);
        assert_eq!(search_data::count(&mut conn).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_drawing_resave_removes_orphaned_runtimes() {
        let test_db = setup_test_db().await;
        let mut conn = test_db.pool.acquire().await.unwrap();
        let mut d = fixtures::drawing(1);
        drawing::save(&mut conn, &d).await.unwrap();

        d.runtimes.truncate(1);
        d.runtimes[0].machine_runtime = 99.5;
        let saved = drawing::save(&mut conn, &d).await.unwrap();

        assert_eq!(saved.runtimes.len(), 1);
        assert_eq!(saved.runtimes[0].machine_runtime, 99.5);
        assert_eq!(runtime::count(&mut conn).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_drawing_resave_without_search_data_removes_it() {
        let test_db = setup_test_db().await;
        let mut conn = test_db.pool.acquire().await.unwrap();
        let mut d = fixtures::drawing(1);
        drawing::save(&mut conn, &d).await.unwrap();

        d.search_data = None;
        let saved = drawing::save(&mut conn, &d).await.unwrap();

        assert!(saved.search_data.is_none());
        assert_eq!(search_data::count(&mut conn).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_drawing_resave_keeps_unlisted_feedbacks() {
        let test_db = setup_test_db().await;
        let mut conn = test_db.pool.acquire().await.unwrap();
        let d = fixtures::drawing(1);
        drawing::save(&mut conn, &d).await.unwrap();
        let h = history::save(&mut conn, &fixtures::history("/q.png")).await.unwrap();
        let h_id = h.history_id.unwrap();
        feedback::save(&mut conn, &fixtures::feedback(h_id, 1, FeedbackValue::Positive)).await.unwrap();

        // Feedbacks are not orphan-removed from the drawing side
        let saved = drawing::save(&mut conn, &d).await.unwrap();

        assert_eq!(saved.feedbacks.len(), 1);
        assert_eq!(feedback::count(&mut conn).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_drawing_delete_cascades() {
        let test_db = setup_test_db().await;
        let mut conn = test_db.pool.acquire().await.unwrap();
        drawing::save(&mut conn, &fixtures::drawing(1)).await.unwrap();
        drawing::save(&mut conn, &fixtures::drawing(2)).await.unwrap();

        assert!(drawing::delete_by_id(&mut conn, 1).await.unwrap());
        assert!(!drawing::delete_by_id(&mut conn, 1).await.unwrap());

        assert_eq!(runtime::count(&mut conn).await.unwrap(), 2);
        assert!(runtime::find_by_drawing_id(&mut conn, 1).await.unwrap().is_empty());
        assert!(search_data::find_by_drawing_id(&mut conn, 1).await.unwrap().is_none());
        assert!(search_data::find_by_drawing_id(&mut conn, 2).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_search_data_save_replaces_previous_entry_of_drawing() {
        let test_db = setup_test_db().await;
        let mut conn = test_db.pool.acquire().await.unwrap();
        drawing::save(&mut conn, &fixtures::drawing(1)).await.unwrap();

        let replacement = fixtures::search_data(555, 1);
        search_data::save(&mut conn, &replacement).await.unwrap();

        assert!(search_data::find_by_id(&mut conn, 100).await.unwrap().is_none());
        let found = search_data::find_by_drawing_id(&mut conn, 1).await.unwrap().unwrap();
        assert_eq!(found.search_data_id, 555);
        assert_eq!(search_data::count(&mut conn).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_search_data_null_features_round_trip() {
        let test_db = setup_test_db().await;
        let mut conn = test_db.pool.acquire().await.unwrap();
        drawing::save(&mut conn, &Drawing::new(1, vec![1])).await.unwrap();

        let mut empty = fixtures::search_data(7, 1);
        empty.features = Default::default();
        let saved = search_data::save(&mut conn, &empty).await.unwrap();

        assert_eq!(saved, empty);
        assert!(search_data::exists(&mut conn, 7).await.unwrap());
    }

    #[tokio::test]
    async fn test_runtime_upsert_overwrites_row() {
        let test_db = setup_test_db().await;
        let mut conn = test_db.pool.acquire().await.unwrap();
        drawing::save(&mut conn, &Drawing::new(1, vec![1])).await.unwrap();

        runtime::save(&mut conn, &fixtures::runtime(5, 1, "mill", 1.0)).await.unwrap();
        runtime::save(&mut conn, &fixtures::runtime(5, 1, "drill", 2.0)).await.unwrap();

        let found = runtime::find_by_id(&mut conn, 5).await.unwrap().unwrap();
        assert_eq!(found.machine, "drill");
        assert_eq!(found.machine_runtime, 2.0);
        assert_eq!(runtime::count(&mut conn).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_runtime_delete_by_drawing_id() {
        let test_db = setup_test_db().await;
        let mut conn = test_db.pool.acquire().await.unwrap();
        drawing::save(&mut conn, &fixtures::drawing(1)).await.unwrap();
        drawing::save(&mut conn, &fixtures::drawing(2)).await.unwrap();

        let removed = runtime::delete_by_drawing_id(&mut conn, 1).await.unwrap();

        assert_eq!(removed, 2);
        assert!(drawing::exists(&mut conn, 1).await.unwrap());
        assert_eq!(runtime::find_all(&mut conn).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_feedback_insert_then_update() {
        let test_db = setup_test_db().await;
        let mut conn = test_db.pool.acquire().await.unwrap();
        drawing::save(&mut conn, &Drawing::new(1, vec![1])).await.unwrap();
        let h = history::save(&mut conn, &fixtures::history("/q.png")).await.unwrap();
        let h_id = h.history_id.unwrap();

        let created = feedback::save(&mut conn, &fixtures::feedback(h_id, 1, FeedbackValue::Neutral))
            .await
            .unwrap();
        assert!(created.feedback_id.is_some());

        let mut changed = created.clone();
        changed.feedback_value = FeedbackValue::Negative;
        changed.feedback_desc = None;
        let updated = feedback::save(&mut conn, &changed).await.unwrap();

        assert_eq!(updated, changed);
        assert_eq!(feedback::count(&mut conn).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_history_save_assigns_id_and_cascades_feedbacks() {
        let test_db = setup_test_db().await;
        let mut conn = test_db.pool.acquire().await.unwrap();
        drawing::save(&mut conn, &Drawing::new(1, vec![1])).await.unwrap();

        let mut h = fixtures::history("/q.png");
        h.add_feedback(fixtures::feedback(0, 1, FeedbackValue::Positive));
        let saved = history::save(&mut conn, &h).await.unwrap();

        let h_id = saved.history_id.unwrap();
        assert_eq!(saved.feedbacks.len(), 1);
        assert_eq!(saved.feedbacks[0].history_id, h_id);
        assert_eq!(saved.timestamp, h.timestamp);
        assert_eq!(feedback::find_by_history_id(&mut conn, h_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_history_resave_removes_orphaned_feedbacks() {
        let test_db = setup_test_db().await;
        let mut conn = test_db.pool.acquire().await.unwrap();
        drawing::save(&mut conn, &Drawing::new(1, vec![1])).await.unwrap();
        let mut h = history::save(&mut conn, &fixtures::history("/q.png")).await.unwrap();
        let h_id = h.history_id.unwrap();
        h.add_feedback(fixtures::feedback(h_id, 1, FeedbackValue::Positive));
        h.add_feedback(fixtures::feedback(h_id, 1, FeedbackValue::Negative));
        let mut h = history::save(&mut conn, &h).await.unwrap();
        assert_eq!(h.feedbacks.len(), 2);

        h.feedbacks.remove(0);
        let saved = history::save(&mut conn, &h).await.unwrap();

        assert_eq!(saved.feedbacks.len(), 1);
        assert_eq!(saved.feedbacks[0].feedback_value, FeedbackValue::Negative);
        assert_eq!(feedback::count(&mut conn).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_history_delete_cascades_only_own_feedbacks() {
        let test_db = setup_test_db().await;
        let mut conn = test_db.pool.acquire().await.unwrap();
        drawing::save(&mut conn, &Drawing::new(1, vec![1])).await.unwrap();
        let a = history::save(&mut conn, &fixtures::history("/a.png")).await.unwrap().history_id.unwrap();
        let b = history::save(&mut conn, &fixtures::history("/b.png")).await.unwrap().history_id.unwrap();
        feedback::save(&mut conn, &fixtures::feedback(a, 1, FeedbackValue::Positive)).await.unwrap();
        feedback::save(&mut conn, &fixtures::feedback(b, 1, FeedbackValue::Neutral)).await.unwrap();

        assert!(history::delete_by_id(&mut conn, a).await.unwrap());

        assert!(feedback::find_by_history_id(&mut conn, a).await.unwrap().is_empty());
        assert_eq!(feedback::find_by_history_id(&mut conn, b).await.unwrap().len(), 1);
        assert!(!history::exists(&mut conn, a).await.unwrap());
    }
}
