use crate::common::{TestApp, routes};

const WELL_FORMED: &str = "\
Equipment Name,Type,Flowrate,Pressure,Temperature
Pump A,Pump,120.5,8.2,65.0
Reactor 1,Reactor,45.0,12.6,300.0
";

mod authorization {
    use super::*;

    #[tokio::test]
    async fn report_without_token_is_unauthorized() {
        let app = TestApp::spawn().await;
        let res = app
            .upload_csv("equipment.csv", WELL_FORMED.as_bytes().to_vec())
            .await;
        let id = res.id();

        let report = app.get_without_token(&routes::report(id)).await;

        assert_eq!(report.status, 401);
        assert_eq!(report.error(), "Authentication required");
    }

    #[tokio::test]
    async fn report_with_invalid_token_is_unauthorized() {
        let app = TestApp::spawn().await;
        let res = app
            .upload_csv("equipment.csv", WELL_FORMED.as_bytes().to_vec())
            .await;
        let id = res.id();

        let report = app
            .get_with_token(&routes::report(id), "not-a-real-token")
            .await;

        assert_eq!(report.status, 401);
    }
}

mod generation {
    use super::*;

    #[tokio::test]
    async fn report_is_a_pdf_attachment() {
        let app = TestApp::spawn().await;
        let res = app
            .upload_csv("equipment.csv", WELL_FORMED.as_bytes().to_vec())
            .await;
        let id = res.id();
        let token = app.create_authenticated_user("reporter1", "pass1234").await;

        let (status, content_type, content_disposition, bytes) =
            app.get_bytes_with_token(&routes::report(id), &token).await;

        assert_eq!(status, 200);
        assert_eq!(content_type.as_deref(), Some("application/pdf"));
        assert_eq!(
            content_disposition.as_deref(),
            Some(format!("attachment; filename=\"equipment_report_{id}.pdf\"").as_str())
        );
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn unknown_dataset_is_not_found_never_500() {
        let app = TestApp::spawn().await;
        let token = app.create_authenticated_user("reporter2", "pass1234").await;

        let report = app.get_with_token(&routes::report(999_999), &token).await;

        assert_eq!(report.status, 404);
        assert_eq!(report.error(), "Dataset not found");
    }

    #[tokio::test]
    async fn empty_numeric_column_renders_placeholder_not_crash() {
        let app = TestApp::spawn().await;
        let csv = "\
Equipment Name,Type,Flowrate,Pressure,Temperature
Pump A,Pump,,8.2,
Pump B,Pump,,7.4,
";
        let res = app.upload_csv("gaps.csv", csv.as_bytes().to_vec()).await;
        assert_eq!(res.status, 201, "body: {}", res.text);
        assert!(res.body["summary"]["avg_flowrate"].is_null());
        let id = res.id();

        let token = app.create_authenticated_user("reporter3", "pass1234").await;
        let (status, _, _, bytes) =
            app.get_bytes_with_token(&routes::report(id), &token).await;

        assert_eq!(status, 200);
        assert!(bytes.starts_with(b"%PDF"));
    }
}
