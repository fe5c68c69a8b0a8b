use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, Method, RequestBuilder, Response,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, instrument};

use crate::{
    error::ApiError,
    models::{
        Attendee, Deliverable, DeliverableFile, DeliverableFlag, Draft, DraftKey, Event, EventId,
        SubmissionRecord, Team,
    },
};

use super::{
    AttendeeApi, AuthToken, DeliverableApi, DeliverableFlagSource, DraftStore, EventSource,
    TeamApi,
};

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub base_url: String,
    pub request_timeout: Option<Duration>,
}

#[derive(Debug)]
pub struct PortalClient {
    http: Client,
    base_url: String,
    auth: AuthToken,
}

#[derive(Serialize)]
struct CreateTeamBody<'a> {
    team_name: &'a str,
}

#[derive(Serialize)]
struct JoinTeamBody<'a> {
    team_code: &'a str,
}

impl PortalClient {
    pub fn new(config: &ClientConfig) -> Result<PortalClient, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(PortalClient {
            http: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            auth: AuthToken::new(),
        })
    }

    pub fn auth(&self) -> &AuthToken {
        &self.auth
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request = self.http.request(method, self.url(path));
        match self.auth.get() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        debug!("Backend responded with {status}: {message}");
        Err(ApiError::from_status(status.as_u16(), message))
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send(self.request(Method::GET, path)).await?;
        PortalClient::read_json(response).await
    }

    /// Like `get_json`, but a 404 or a `null` body mean "nothing there".
    async fn get_optional_json<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Option<T>, ApiError> {
        match self.send(self.request(Method::GET, path)).await {
            Ok(response) => PortalClient::read_json(response).await,
            Err(ApiError::NotFound) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .send(self.request(Method::POST, path).json(body))
            .await?;
        PortalClient::read_json(response).await
    }

    fn draft_path(key: &DraftKey) -> String {
        format!("events/{}/drafts/{}", key.event_id, key.user_id)
    }
}

#[async_trait]
impl EventSource for PortalClient {
    #[instrument(skip(self))]
    async fn fetch_event(&self, event_id: EventId) -> Result<Event, ApiError> {
        self.get_json(&format!("events/{event_id}")).await
    }
}

#[async_trait]
impl DeliverableFlagSource for PortalClient {
    #[instrument(skip(self))]
    async fn fetch_deliverable_flags(
        &self,
        event_id: EventId,
    ) -> Result<Vec<DeliverableFlag>, ApiError> {
        self.get_json(&format!("events/{event_id}/deliverable-flags"))
            .await
    }
}

#[async_trait]
impl DraftStore for PortalClient {
    #[instrument(skip(self))]
    async fn load_draft(&self, key: &DraftKey) -> Result<Option<Draft>, ApiError> {
        self.get_optional_json(&PortalClient::draft_path(key)).await
    }

    #[instrument(skip(self, draft))]
    async fn save_draft(&self, key: &DraftKey, draft: &Draft) -> Result<(), ApiError> {
        self.send(
            self.request(Method::PUT, &PortalClient::draft_path(key))
                .json(draft),
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_draft(&self, key: &DraftKey) -> Result<(), ApiError> {
        match self
            .send(self.request(Method::DELETE, &PortalClient::draft_path(key)))
            .await
        {
            Ok(_) | Err(ApiError::NotFound) => Ok(()),
            Err(err) => Err(err),
        }
    }
}

#[async_trait]
impl TeamApi for PortalClient {
    #[instrument(skip(self))]
    async fn get_team(&self, event_id: EventId) -> Result<Option<Team>, ApiError> {
        self.get_optional_json(&format!("events/{event_id}/team"))
            .await
    }

    #[instrument(skip(self))]
    async fn create_team(&self, event_id: EventId, team_name: &str) -> Result<Team, ApiError> {
        self.post_json(
            &format!("events/{event_id}/team"),
            &CreateTeamBody { team_name },
        )
        .await
    }

    #[instrument(skip(self))]
    async fn join_team(&self, event_id: EventId, team_code: &str) -> Result<Team, ApiError> {
        self.post_json(
            &format!("events/{event_id}/team/join"),
            &JoinTeamBody { team_code },
        )
        .await
    }

    #[instrument(skip(self))]
    async fn leave_team(&self, event_id: EventId) -> Result<(), ApiError> {
        self.send(self.request(Method::POST, &format!("events/{event_id}/team/leave")))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl DeliverableApi for PortalClient {
    #[instrument(skip(self))]
    async fn list_deliverables(&self, event_id: EventId) -> Result<Vec<Deliverable>, ApiError> {
        self.get_json(&format!("events/{event_id}/deliverables"))
            .await
    }

    #[instrument(skip(self, files), fields(files = files.len()))]
    async fn submit_deliverables(
        &self,
        event_id: EventId,
        files: &[(String, DeliverableFile)],
    ) -> Result<(), ApiError> {
        let mut form = Form::new();
        for (deliverable_id, file) in files {
            let mut part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
            if let Some(content_type) = &file.content_type {
                part = part.mime_str(content_type)?;
            }
            form = form.part(deliverable_id.clone(), part);
        }

        self.send(
            self.request(Method::POST, &format!("events/{event_id}/submissions"))
                .multipart(form),
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn latest_submission(
        &self,
        event_id: EventId,
    ) -> Result<Option<SubmissionRecord>, ApiError> {
        self.get_optional_json(&format!("events/{event_id}/submissions/latest"))
            .await
    }
}

#[async_trait]
impl AttendeeApi for PortalClient {
    #[instrument(skip(self))]
    async fn fetch_attendee(&self, event_id: EventId) -> Result<Option<Attendee>, ApiError> {
        self.get_optional_json(&format!("events/{event_id}/attendee"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use reqwest::Client;
    use test_log::test;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::{TcpListener, TcpStream},
    };
    use uuid::Uuid;

    use crate::{
        api::{AttendeeApi, AuthToken, DeliverableApi, DraftStore, TeamApi},
        error::ApiError,
        models::{DeliverableFile, DraftKey, EventId, UserId},
        team_flow::{TeamFlow, TeamFlowError},
    };

    use super::{ClientConfig, PortalClient};

    #[derive(Clone, Debug)]
    struct SeenRequest {
        method: String,
        path: String,
        headers: Vec<(String, String)>,
        body: Vec<u8>,
    }

    impl SeenRequest {
        fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(header, _)| header == name)
                .map(|(_, value)| value.as_str())
        }

        fn body_text(&self) -> String {
            String::from_utf8_lossy(&self.body).into_owned()
        }
    }

    /// Answers one connection per canned response, in order, and records what it was sent.
    struct StubBackend {
        base_url: String,
        seen: Arc<Mutex<Vec<SeenRequest>>>,
    }

    impl StubBackend {
        async fn start(responses: Vec<(u16, &'static str)>) -> StubBackend {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            let seen = Arc::new(Mutex::new(Vec::new()));

            let recorded = seen.clone();
            tokio::spawn(async move {
                for (status, body) in responses {
                    let (mut stream, _) = listener.accept().await.unwrap();
                    let request = read_request(&mut stream).await;
                    recorded.lock().unwrap().push(request);

                    let response = format!(
                        "HTTP/1.1 {status} Stub\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    stream.write_all(response.as_bytes()).await.unwrap();
                    stream.shutdown().await.unwrap();
                }
            });

            StubBackend {
                base_url: format!("http://{addr}/api"),
                seen,
            }
        }

        fn client(&self) -> PortalClient {
            PortalClient {
                http: Client::builder().no_proxy().build().unwrap(),
                base_url: self.base_url.clone(),
                auth: AuthToken::new(),
            }
        }

        fn seen(&self) -> Vec<SeenRequest> {
            self.seen.lock().unwrap().clone()
        }
    }

    fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack
            .windows(needle.len())
            .position(|window| window == needle)
    }

    async fn read_more(stream: &mut TcpStream, buf: &mut Vec<u8>) {
        let mut chunk = [0u8; 4096];
        let read = stream.read(&mut chunk).await.unwrap();
        assert!(read > 0, "client hung up mid-request");
        buf.extend_from_slice(&chunk[..read]);
    }

    async fn read_request(stream: &mut TcpStream) -> SeenRequest {
        let mut buf = Vec::new();
        let head_end = loop {
            if let Some(pos) = find(&buf, b"\r\n\r\n") {
                break pos + 4;
            }
            read_more(stream, &mut buf).await;
        };

        let head = String::from_utf8_lossy(&buf[..head_end]).into_owned();
        let mut lines = head.split("\r\n");
        let mut request_line = lines.next().unwrap().split(' ');
        let method = request_line.next().unwrap().to_owned();
        let path = request_line.next().unwrap().to_owned();
        let headers: Vec<(String, String)> = lines
            .filter_map(|line| line.split_once(':'))
            .map(|(name, value)| (name.trim().to_ascii_lowercase(), value.trim().to_owned()))
            .collect();

        let chunked = headers
            .iter()
            .any(|(name, value)| name == "transfer-encoding" && value.contains("chunked"));
        let body = if chunked {
            while !buf[head_end..].ends_with(b"0\r\n\r\n") {
                read_more(stream, &mut buf).await;
            }
            buf[head_end..].to_vec()
        } else {
            let length = headers
                .iter()
                .find(|(name, _)| name == "content-length")
                .and_then(|(_, value)| value.parse::<usize>().ok())
                .unwrap_or(0);
            while buf.len() < head_end + length {
                read_more(stream, &mut buf).await;
            }
            buf[head_end..head_end + length].to_vec()
        };

        SeenRequest {
            method,
            path,
            headers,
            body,
        }
    }

    fn event() -> EventId {
        EventId(Uuid::from_u128(1))
    }

    fn key() -> DraftKey {
        DraftKey::new(event(), UserId::from("user-1"))
    }

    #[test]
    fn urls_are_joined_with_one_slash() {
        let client = PortalClient::new(&ClientConfig {
            base_url: "https://api.example.org/v1/".to_owned(),
            request_timeout: None,
        })
        .unwrap();

        assert_eq!(
            client.url("/events/1"),
            "https://api.example.org/v1/events/1"
        );
        assert_eq!(client.url("events/1"), "https://api.example.org/v1/events/1");
    }

    #[test]
    fn draft_path() {
        assert_eq!(
            PortalClient::draft_path(&key()),
            "events/00000000-0000-0000-0000-000000000001/drafts/user-1"
        );
    }

    #[test(tokio::test)]
    async fn missing_records_are_none() {
        let backend = StubBackend::start(vec![
            (404, r#"{"detail":"Not found"}"#),
            (200, "null"),
            (404, r#"{"detail":"No submission"}"#),
            (200, r#"{"name":"Ada"}"#),
        ])
        .await;
        let client = backend.client();

        assert_eq!(client.load_draft(&key()).await.unwrap(), None);
        assert_eq!(client.get_team(event()).await.unwrap(), None);
        assert_eq!(client.latest_submission(event()).await.unwrap(), None);

        let draft = client.load_draft(&key()).await.unwrap().unwrap();
        assert_eq!(draft["name"], "Ada");

        let paths = backend
            .seen()
            .into_iter()
            .map(|request| format!("{} {}", request.method, request.path))
            .collect::<Vec<String>>();
        assert_eq!(
            paths,
            [
                "GET /api/events/00000000-0000-0000-0000-000000000001/drafts/user-1",
                "GET /api/events/00000000-0000-0000-0000-000000000001/team",
                "GET /api/events/00000000-0000-0000-0000-000000000001/submissions/latest",
                "GET /api/events/00000000-0000-0000-0000-000000000001/drafts/user-1",
            ]
        );
    }

    #[test(tokio::test)]
    async fn conflicts_are_classified() {
        let backend = StubBackend::start(vec![
            (409, r#"{"detail":"Duplicate"}"#),
            (400, r#"{"detail":"Team name already exists"}"#),
            (400, r#"{"detail":"Invalid team code"}"#),
        ])
        .await;
        let client = backend.client();

        assert!(client.create_team(event(), "Rustaceans").await.unwrap_err().is_conflict());
        assert!(client.create_team(event(), "Rustaceans").await.unwrap_err().is_conflict());
        assert!(matches!(
            client.join_team(event(), "XYZ").await,
            Err(ApiError::Status { status: 400, .. })
        ));

        let create = &backend.seen()[0];
        assert_eq!(create.method, "POST");
        let body: serde_json::Value = serde_json::from_slice(&create.body).unwrap();
        assert_eq!(body["team_name"], "Rustaceans");
    }

    #[test(tokio::test)]
    async fn taken_team_name_reaches_the_attendee() {
        let backend =
            StubBackend::start(vec![(400, r#"{"detail":"Team name already exists"}"#)]).await;
        let mut flow = TeamFlow::new(Arc::new(backend.client()), event());

        assert_eq!(
            flow.create_team("Rustaceans").await.unwrap_err(),
            TeamFlowError::NameUnavailable
        );
        assert_eq!(
            TeamFlowError::NameUnavailable.to_string(),
            "Team name unavailable!"
        );
        assert!(flow.team().is_none());
    }

    #[test(tokio::test)]
    async fn bearer_token_follows_auth_state() {
        let backend = StubBackend::start(vec![(200, "null"), (200, "null")]).await;
        let client = backend.client();

        client.auth().set("secret");
        assert_eq!(client.fetch_attendee(event()).await.unwrap(), None);
        client.auth().clear();
        assert_eq!(client.fetch_attendee(event()).await.unwrap(), None);

        let seen = backend.seen();
        assert_eq!(seen[0].header("authorization"), Some("Bearer secret"));
        assert_eq!(seen[1].header("authorization"), None);
    }

    #[test(tokio::test)]
    async fn submission_has_one_part_per_deliverable() {
        let backend = StubBackend::start(vec![(201, "{}")]).await;
        let client = backend.client();

        let files = vec![
            (
                "slides".to_owned(),
                DeliverableFile {
                    file_name: "deck.pdf".to_owned(),
                    content_type: Some("application/pdf".to_owned()),
                    bytes: b"%PDF-1.7".to_vec(),
                },
            ),
            (
                "video".to_owned(),
                DeliverableFile {
                    file_name: "demo.mp4".to_owned(),
                    content_type: None,
                    bytes: vec![0, 1, 2, 3],
                },
            ),
        ];
        client.submit_deliverables(event(), &files).await.unwrap();

        let request = &backend.seen()[0];
        assert_eq!(request.method, "POST");
        assert_eq!(
            request.path,
            "/api/events/00000000-0000-0000-0000-000000000001/submissions"
        );
        assert!(request
            .header("content-type")
            .unwrap()
            .starts_with("multipart/form-data"));

        let body = request.body_text().to_ascii_lowercase();
        assert_eq!(body.matches("content-disposition: form-data;").count(), 2);
        assert!(body.contains(r#"name="slides"; filename="deck.pdf""#));
        assert!(body.contains(r#"name="video"; filename="demo.mp4""#));
        assert!(body.contains("content-type: application/pdf"));
    }

    #[test(tokio::test)]
    async fn deleting_a_missing_draft_succeeds() {
        let backend = StubBackend::start(vec![
            (404, r#"{"detail":"Not found"}"#),
            (500, "boom"),
        ])
        .await;
        let client = backend.client();

        client.delete_draft(&key()).await.unwrap();
        assert!(matches!(
            client.delete_draft(&key()).await,
            Err(ApiError::Status { status: 500, .. })
        ));
        assert_eq!(backend.seen()[0].method, "DELETE");
    }
}
