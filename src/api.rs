use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt;
use std::io::{BufRead, BufReader};
use std::time::Duration;
use url::Url;

/// Errors produced by the gateway client. `Unauthorized` is split out so the
/// session gate can react to an expired credential.
#[derive(Debug)]
pub enum ApiError {
    Unauthorized,
    Http(reqwest::Error),
    Status { status: u16, body: String },
    Decode(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Unauthorized => write!(f, "authentication expired"),
            ApiError::Http(e) => write!(f, "request failed: {e}"),
            ApiError::Status { status, body } => {
                let body = body.trim();
                if body.is_empty() {
                    write!(f, "server returned status {status}")
                } else {
                    write!(f, "server returned status {status}: {body}")
                }
            }
            ApiError::Decode(msg) => write!(f, "unexpected response: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Http(e)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    pub task: String,
    pub completed: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ExchangeRate {
    pub currency: String,
    pub rate: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherReport {
    pub name: String,
    #[serde(default)]
    pub weather: Vec<WeatherCondition>,
    pub main: WeatherMain,
    pub wind: WeatherWind,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherCondition {
    pub main: String,
    pub description: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherMain {
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherWind {
    pub speed: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Poll {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub allow_change_vote: bool,
    #[serde(default)]
    pub total_votes: i64,
    #[serde(default)]
    pub user_voted_option_id: Option<i64>,
    #[serde(default)]
    pub options: Vec<PollOption>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollOption {
    pub id: i64,
    pub option_text: String,
    #[serde(default)]
    pub display_order: i64,
    #[serde(default)]
    pub vote_count: i64,
    #[serde(default)]
    pub percentage: f64,
}

/// Blocking HTTP client for the remote backend. Attaches the bearer
/// credential to every request; callers run it off the UI thread.
pub struct ApiClient {
    base: Url,
    token: String,
    client: Client,
}

impl ApiClient {
    pub fn new(base_url: &str, token: &str) -> anyhow::Result<Self> {
        let base = Url::parse(base_url)?;
        let client = Client::builder()
            .user_agent(concat!("homeboard/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self {
            base,
            token: token.to_string(),
            client,
        })
    }

    fn url(&self, path_and_query: &str) -> ApiResult<Url> {
        self.base
            .join(path_and_query)
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    fn read_body(resp: Response) -> ApiResult<String> {
        let status = resp.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(ApiError::Unauthorized);
        }
        let body = resp.text()?;
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    fn parse<T: DeserializeOwned>(body: &str) -> ApiResult<T> {
        serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    fn get(&self, path_and_query: &str) -> ApiResult<String> {
        let resp = self
            .client
            .get(self.url(path_and_query)?)
            .bearer_auth(&self.token)
            .send()?;
        Self::read_body(resp)
    }

    fn send_json(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> ApiResult<String> {
        let mut req = self
            .client
            .request(method, self.url(path)?)
            .bearer_auth(&self.token);
        if let Some(body) = body {
            req = req
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body.to_string());
        }
        Self::read_body(req.send()?)
    }

    pub fn list_todos(&self) -> ApiResult<Vec<Todo>> {
        Self::parse(&self.get("/api/v1/todo")?)
    }

    pub fn create_todo(&self, task: &str) -> ApiResult<Todo> {
        let body = serde_json::json!({ "task": task });
        Self::parse(&self.send_json(reqwest::Method::POST, "/api/v1/todo", Some(body))?)
    }

    pub fn set_todo_completed(&self, id: i64, completed: bool) -> ApiResult<Todo> {
        let path = if completed {
            format!("/api/v1/todo/{id}/complete")
        } else {
            format!("/api/v1/todo/{id}/incomplete")
        };
        Self::parse(&self.send_json(reqwest::Method::PATCH, &path, None)?)
    }

    pub fn delete_todo(&self, id: i64) -> ApiResult<()> {
        self.send_json(reqwest::Method::DELETE, &format!("/api/v1/todo/{id}"), None)?;
        Ok(())
    }

    pub fn weather(&self, city: &str) -> ApiResult<WeatherReport> {
        let path = format!("/api/v1/weather?city={}", urlencoding::encode(city));
        Self::parse(&self.get(&path)?)
    }

    pub fn exchange_rates(&self, currencies: &[String]) -> ApiResult<Vec<ExchangeRate>> {
        let path = format!(
            "/api/v1/rates?currencies={}",
            urlencoding::encode(&currencies.join(","))
        );
        Self::parse(&self.get(&path)?)
    }

    pub fn poll(&self, poll_id: i64) -> ApiResult<Poll> {
        Self::parse(&self.get(&format!("/api/polls/{poll_id}"))?)
    }

    pub fn submit_vote(&self, poll_id: i64, option_id: i64) -> ApiResult<()> {
        let body = serde_json::json!({ "pollId": poll_id, "optionId": option_id });
        self.send_json(reqwest::Method::POST, "/api/votes", Some(body))?;
        Ok(())
    }

    /// Send a chat message and consume the SSE reply, invoking `on_chunk` for
    /// each `data:` line as it arrives. Returns the assembled message.
    pub fn stream_ai_message(
        &self,
        message: &str,
        provider: &str,
        on_chunk: impl FnMut(&str),
    ) -> ApiResult<String> {
        let path = format!(
            "/api/ai/stream?message={}&provider={}",
            urlencoding::encode(message),
            urlencoding::encode(provider)
        );
        let resp = self
            .client
            .get(self.url(&path)?)
            .bearer_auth(&self.token)
            .send()?;
        let status = resp.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: resp.text().unwrap_or_default(),
            });
        }
        read_sse_stream(BufReader::new(resp), on_chunk)
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Terminal sentinel closing an SSE stream; not part of the message.
const SSE_DONE: &str = "[DONE]";

/// Extract the payload of a single `data:` line, tolerating one leading space.
fn sse_data(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("data:")?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}

/// Concatenate the `data:` payloads of an SSE stream in arrival order,
/// ignoring comments and other fields, stopping at the `[DONE]` sentinel.
pub fn read_sse_stream(
    reader: impl BufRead,
    mut on_chunk: impl FnMut(&str),
) -> std::io::Result<String> {
    let mut full = String::new();
    for line in reader.lines() {
        let line = line?;
        let Some(data) = sse_data(line.trim_end_matches('\r')) else {
            continue;
        };
        if data == SSE_DONE {
            break;
        }
        if !data.is_empty() {
            full.push_str(data);
            on_chunk(data);
        }
    }
    Ok(full)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn sse_chunks_concatenate_in_order() {
        let stream = "data: Hello\ndata: , \ndata: world\n";
        let mut chunks = Vec::new();
        let full = read_sse_stream(Cursor::new(stream), |c| chunks.push(c.to_string()))
            .expect("read stream");
        assert_eq!(full, "Hello, world");
        assert_eq!(chunks, vec!["Hello", ", ", "world"]);
    }

    #[test]
    fn non_data_lines_are_ignored() {
        let stream = ": comment\nevent: message\ndata: payload\n\nretry: 100\n";
        let full = read_sse_stream(Cursor::new(stream), |_| {}).expect("read stream");
        assert_eq!(full, "payload");
    }

    #[test]
    fn done_sentinel_terminates_the_stream() {
        let stream = "data: before\ndata: [DONE]\ndata: after\n";
        let full = read_sse_stream(Cursor::new(stream), |_| {}).expect("read stream");
        assert_eq!(full, "before");
    }

    #[test]
    fn crlf_lines_are_tolerated() {
        let stream = "data: a\r\ndata: b\r\n";
        let full = read_sse_stream(Cursor::new(stream), |_| {}).expect("read stream");
        assert_eq!(full, "ab");
    }
}
