use crate::common::{TestApp, routes};

const WELL_FORMED: &str = "\
Equipment Name,Type,Flowrate,Pressure,Temperature
Pump A,Pump,120.5,8.2,65.0
Reactor 1,Reactor,45.0,12.6,300.0
Pump B,Pump,98.5,7.4,61.0
";

/// A distinct well-formed CSV per `n`, so retention tests get unique blobs.
fn numbered_csv(n: i64) -> Vec<u8> {
    format!(
        "Equipment Name,Type,Flowrate,Pressure,Temperature\nPump {n},Pump,{n}.0,1.0,20.0\n"
    )
    .into_bytes()
}

mod upload {
    use super::*;

    #[tokio::test]
    async fn well_formed_csv_returns_summary_and_rows() {
        let app = TestApp::spawn().await;

        let res = app
            .upload_csv("equipment.csv", WELL_FORMED.as_bytes().to_vec())
            .await;

        assert_eq!(res.status, 201, "body: {}", res.text);
        assert_eq!(res.body["name"].as_str().unwrap(), "equipment.csv");

        let summary = &res.body["summary"];
        assert_eq!(summary["total_count"].as_i64().unwrap(), 3);
        // Means rounded to 2 decimals in the upload response.
        assert_eq!(summary["avg_flowrate"].as_f64().unwrap(), 88.0);
        assert_eq!(summary["avg_pressure"].as_f64().unwrap(), 9.4);
        assert_eq!(summary["avg_temperature"].as_f64().unwrap(), 142.0);
        assert_eq!(summary["equipment_types"]["Pump"].as_i64().unwrap(), 2);
        assert_eq!(summary["equipment_types"]["Reactor"].as_i64().unwrap(), 1);

        let data = res.body["data"].as_array().unwrap();
        assert_eq!(data.len(), 3);
        assert_eq!(data[0]["Equipment Name"].as_str().unwrap(), "Pump A");
        assert_eq!(data[1]["Type"].as_str().unwrap(), "Reactor");
        assert_eq!(data[2]["Flowrate"].as_f64().unwrap(), 98.5);
    }

    #[tokio::test]
    async fn missing_columns_are_named_exactly() {
        let app = TestApp::spawn().await;
        let csv = "Equipment Name,Type,Flowrate\nPump A,Pump,120.5\n";

        let res = app.upload_csv("partial.csv", csv.as_bytes().to_vec()).await;

        assert_eq!(res.status, 400);
        assert_eq!(
            res.error(),
            "Missing required columns: Pressure, Temperature"
        );
    }

    #[tokio::test]
    async fn non_numeric_column_is_named() {
        let app = TestApp::spawn().await;
        let csv = "\
Equipment Name,Type,Flowrate,Pressure,Temperature
Pump A,Pump,120.5,high,65.0
";

        let res = app.upload_csv("typed.csv", csv.as_bytes().to_vec()).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.error(), "Column \"Pressure\" must contain numeric values");
    }

    #[tokio::test]
    async fn empty_file_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.upload_csv("empty.csv", Vec::new()).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.error(), "CSV file is empty");
    }

    #[tokio::test]
    async fn wrong_extension_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .upload_csv("equipment.xlsx", WELL_FORMED.as_bytes().to_vec())
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.error(), "Invalid file format. Please upload a CSV file.");
    }

    #[tokio::test]
    async fn missing_file_field_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.upload_without_file().await;

        assert_eq!(res.status, 400);
        assert_eq!(res.error(), "No file provided");
    }

    #[tokio::test]
    async fn rejected_upload_stores_nothing() {
        let app = TestApp::spawn().await;
        let csv = "Equipment Name,Type\nPump A,Pump\n";

        let res = app.upload_csv("partial.csv", csv.as_bytes().to_vec()).await;
        assert_eq!(res.status, 400);

        let list = app.get_without_token(routes::DATASETS).await;
        assert_eq!(list.body.as_array().unwrap().len(), 0);
    }
}

mod retention {
    use super::*;

    #[tokio::test]
    async fn six_uploads_keep_the_five_most_recent() {
        let app = TestApp::spawn().await;

        let mut ids = Vec::new();
        for n in 1..=6 {
            let res = app.upload_csv("equipment.csv", numbered_csv(n)).await;
            assert_eq!(res.status, 201, "upload {n} failed: {}", res.text);
            ids.push(res.id());
        }

        let list = app.get_without_token(routes::DATASETS).await;
        assert_eq!(list.status, 200);

        let listed_ids: Vec<i64> = list
            .body
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["id"].as_i64().unwrap())
            .collect();

        // The five most recent survive, newest first.
        let expected: Vec<i64> = ids[1..].iter().rev().map(|&id| id as i64).collect();
        assert_eq!(listed_ids, expected);

        // The evicted record is gone entirely.
        let evicted = app.get_without_token(&routes::dataset(ids[0])).await;
        assert_eq!(evicted.status, 404);

        // Exactly five rows survive in the table itself.
        use sea_orm::{EntityTrait, PaginatorTrait};
        let rows = server::entity::dataset::Entity::find()
            .count(&app.db)
            .await
            .unwrap();
        assert_eq!(rows, 5);
    }

    #[tokio::test]
    async fn evicted_blob_is_deleted_from_disk() {
        let app = TestApp::spawn().await;

        let first = numbered_csv(1);
        let res = app.upload_csv("equipment.csv", first.clone()).await;
        assert_eq!(res.status, 201);
        assert!(app.blob_path_for(&first).exists());

        for n in 2..=6 {
            let res = app.upload_csv("equipment.csv", numbered_csv(n)).await;
            assert_eq!(res.status, 201);
        }

        assert!(!app.blob_path_for(&first).exists());
        // Survivors keep their blobs.
        assert!(app.blob_path_for(&numbered_csv(6)).exists());
    }

    #[tokio::test]
    async fn shared_blob_survives_pruning_one_referent() {
        let app = TestApp::spawn().await;
        let same_content = numbered_csv(42);

        // Six uploads of identical content: one blob, six records, the oldest
        // record is pruned but the blob stays referenced by the survivors.
        for _ in 1..=6 {
            let res = app.upload_csv("equipment.csv", same_content.clone()).await;
            assert_eq!(res.status, 201);
        }

        let list = app.get_without_token(routes::DATASETS).await;
        assert_eq!(list.body.as_array().unwrap().len(), 5);
        assert!(app.blob_path_for(&same_content).exists());
    }
}

mod listing {
    use super::*;

    #[tokio::test]
    async fn list_is_newest_first() {
        let app = TestApp::spawn().await;
        for n in 1..=3 {
            app.upload_csv("equipment.csv", numbered_csv(n)).await;
        }

        let list = app.get_without_token(routes::DATASETS).await;
        let ids: Vec<i64> = list
            .body
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["id"].as_i64().unwrap())
            .collect();

        let mut sorted = ids.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(ids, sorted);
        assert_eq!(ids.len(), 3);
    }

    #[tokio::test]
    async fn list_records_carry_full_precision_means() {
        let app = TestApp::spawn().await;
        // Pressures 8.2, 12.6, 7.4 mean to 9.400000000000002 at full precision.
        let res = app
            .upload_csv("equipment.csv", WELL_FORMED.as_bytes().to_vec())
            .await;
        assert_eq!(res.status, 201);

        let list = app.get_without_token(routes::DATASETS).await;
        let record = &list.body.as_array().unwrap()[0];
        let stored = record["avg_pressure"].as_f64().unwrap();
        assert!((stored - (8.2 + 12.6 + 7.4) / 3.0).abs() < 1e-12);
    }

    #[tokio::test]
    async fn get_returns_one_record() {
        let app = TestApp::spawn().await;
        let res = app
            .upload_csv("equipment.csv", WELL_FORMED.as_bytes().to_vec())
            .await;
        let id = res.id();

        let got = app.get_without_token(&routes::dataset(id)).await;

        assert_eq!(got.status, 200);
        assert_eq!(got.body["id"].as_i64().unwrap(), id as i64);
        assert_eq!(got.body["total_count"].as_i64().unwrap(), 3);
        assert!(got.body["content_hash"].as_str().is_some());
    }

    #[tokio::test]
    async fn get_unknown_id_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(&routes::dataset(999_999)).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.error(), "Dataset not found");
    }
}
