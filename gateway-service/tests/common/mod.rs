use gateway_service::config::{GatewayConfig, MediaTransport};
use gateway_service::startup::Application;
use uuid::Uuid;
use wiremock::MockServer;

pub struct TestApp {
    pub address: String,
    pub upload_dir: String,
    pub mock_gemini: MockServer,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(MediaTransport::FileApi).await
    }

    pub async fn spawn_with(transport: MediaTransport) -> Self {
        std::env::set_var("GEMINI_API_KEY", "test-key");

        let mock_gemini = MockServer::start().await;
        let upload_dir = format!("target/test-uploads-{}", Uuid::new_v4());

        let mut config = GatewayConfig::load().expect("Failed to load configuration");
        config.common.port = 0; // Random port for testing
        config.gemini.model = "gemini-2.5-flash".to_string();
        config.gemini.base_url = mock_gemini.uri();
        config.upload.transport = transport;
        config.upload.dir = upload_dir.clone();

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to be ready by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            upload_dir,
            mock_gemini,
        }
    }

    /// Names of files currently staged in the upload directory.
    pub async fn staged_files(&self) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(mut entries) = tokio::fs::read_dir(&self.upload_dir).await {
            while let Ok(Some(entry)) = entries.next_entry().await {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names
    }

    /// Cleanup test resources (staged upload directory).
    pub async fn cleanup(&self) {
        let _ = tokio::fs::remove_dir_all(&self.upload_dir).await;
    }
}
