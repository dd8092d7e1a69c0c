use crate::error::UpstreamError;
use crate::metrics_defs::UPSTREAM_REQUESTS;
use crate::series::{RawRow, RawSeries, RawTimestamp};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::time::Duration;
use tokio::sync::OnceCell;
use url::Url;

const EXPLORE_PATH: &str = "trends/api/explore";
const WIDGETDATA_PATH: &str = "trends/api/widgetdata/multiline";
const TIMESERIES_WIDGET_ID: &str = "TIMESERIES";

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/120.0.0.0 Safari/537.36";

/// Capability for fetching interest-over-time data for one geo.
///
/// The aggregator only sees this trait; the concrete client is injected by
/// the composition root.
#[async_trait]
pub trait TrendsClient: Send + Sync {
    /// Fetches a wide-format series for the given keywords, geo and
    /// timeframe. An empty geo code means worldwide.
    async fn interest_over_time(
        &self,
        keywords: &[String],
        geo: &str,
        timeframe: &str,
    ) -> Result<RawSeries, UpstreamError>;
}

/// Settings for [`GoogleTrendsClient`].
#[derive(Debug, Clone)]
pub struct GoogleTrendsConfig {
    pub base_url: Url,
    /// Host language passed on every call, e.g. "en-US".
    pub hl: String,
    /// Minute offset from UTC the upstream uses to bucket timestamps.
    pub tz: i32,
    /// Per-call timeout covering connect, send and body collection.
    pub timeout: Duration,
}

/// Client for the Google Trends widget API.
///
/// One interest-over-time fetch is two calls: `explore` registers the
/// comparison payload and hands back a token for the TIMESERIES widget,
/// then `widgetdata/multiline` returns the actual series. Both endpoints
/// prefix their JSON with `)]}'` garbage that has to be stripped, and both
/// expect the session cookies established by a plain page load first.
pub struct GoogleTrendsClient {
    http: reqwest::Client,
    base_url: Url,
    hl: String,
    tz: i32,
    cookies: OnceCell<()>,
}

#[derive(Serialize)]
struct ComparisonItem<'a> {
    keyword: &'a str,
    geo: &'a str,
    time: &'a str,
}

#[derive(Serialize)]
struct ExploreRequest<'a> {
    #[serde(rename = "comparisonItem")]
    comparison_item: Vec<ComparisonItem<'a>>,
    category: u32,
    property: &'a str,
}

#[derive(Deserialize)]
struct ExploreResponse {
    widgets: Vec<Widget>,
}

#[derive(Deserialize)]
struct Widget {
    id: String,
    token: Option<String>,
    request: Option<JsonValue>,
}

#[derive(Deserialize)]
struct WidgetDataResponse {
    default: Timeline,
}

#[derive(Deserialize)]
struct Timeline {
    #[serde(rename = "timelineData")]
    timeline_data: Vec<TimelinePoint>,
}

/// One upstream row. Extra columns (`formattedTime`, `isPartial`, ...) are
/// dropped here by not deserializing them.
#[derive(Deserialize)]
struct TimelinePoint {
    /// Seconds since the Unix epoch, as a decimal string.
    time: String,
    value: Vec<i64>,
}

impl GoogleTrendsClient {
    pub fn new(config: GoogleTrendsConfig) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
            hl: config.hl,
            tz: config.tz,
            cookies: OnceCell::new(),
        })
    }

    /// Loads the trends front page once per client lifetime so the cookie
    /// jar holds the session cookies the widget endpoints require.
    async fn ensure_cookies(&self) -> Result<(), UpstreamError> {
        self.cookies
            .get_or_try_init(|| async {
                self.http
                    .get(self.base_url.clone())
                    .send()
                    .await?
                    .error_for_status()?;
                Ok::<_, UpstreamError>(())
            })
            .await?;
        Ok(())
    }

    async fn get_json_body(&self, url: Url, query: &[(&str, &str)]) -> Result<String, UpstreamError> {
        let response = self.http.get(url).query(query).send().await?;
        if !response.status().is_success() {
            return Err(UpstreamError::Status(response.status()));
        }
        Ok(response.text().await?)
    }

    /// Registers the comparison payload and returns the TIMESERIES widget
    /// (token plus the request object to echo back at widgetdata).
    async fn explore(
        &self,
        keywords: &[String],
        geo: &str,
        timeframe: &str,
    ) -> Result<(String, JsonValue), UpstreamError> {
        let req = ExploreRequest {
            comparison_item: keywords
                .iter()
                .map(|keyword| ComparisonItem {
                    keyword,
                    geo,
                    time: timeframe,
                })
                .collect(),
            category: 0,
            property: "",
        };
        let req_json = serde_json::to_string(&req)?;
        let tz = self.tz.to_string();

        let url = self.base_url.join(EXPLORE_PATH)?;
        let body = self
            .get_json_body(url, &[("hl", &self.hl), ("tz", &tz), ("req", &req_json)])
            .await?;

        let explore: ExploreResponse = serde_json::from_str(strip_json_prefix(&body)?)?;
        let widget = explore
            .widgets
            .into_iter()
            .find(|widget| widget.id == TIMESERIES_WIDGET_ID)
            .ok_or(UpstreamError::MissingWidget)?;

        match (widget.token, widget.request) {
            (Some(token), Some(request)) => Ok((token, request)),
            _ => Err(UpstreamError::MalformedResponse(
                "TIMESERIES widget missing token or request".into(),
            )),
        }
    }

    /// Fetches the timeline for a previously explored widget.
    async fn widget_data(
        &self,
        token: &str,
        request: &JsonValue,
        expected_columns: usize,
    ) -> Result<RawSeries, UpstreamError> {
        let req_json = serde_json::to_string(request)?;
        let tz = self.tz.to_string();

        let url = self.base_url.join(WIDGETDATA_PATH)?;
        let body = self
            .get_json_body(
                url,
                &[
                    ("hl", &self.hl),
                    ("tz", &tz),
                    ("req", &req_json),
                    ("token", token),
                ],
            )
            .await?;

        let data: WidgetDataResponse = serde_json::from_str(strip_json_prefix(&body)?)?;

        let mut rows = Vec::with_capacity(data.default.timeline_data.len());
        for point in data.default.timeline_data {
            if point.value.len() != expected_columns {
                return Err(UpstreamError::MalformedResponse(format!(
                    "expected {} values per row, got {}",
                    expected_columns,
                    point.value.len()
                )));
            }
            rows.push(RawRow {
                timestamp: parse_epoch_seconds(&point.time)?,
                values: point.value,
            });
        }

        Ok(RawSeries { rows })
    }
}

#[async_trait]
impl TrendsClient for GoogleTrendsClient {
    async fn interest_over_time(
        &self,
        keywords: &[String],
        geo: &str,
        timeframe: &str,
    ) -> Result<RawSeries, UpstreamError> {
        metrics::counter!(UPSTREAM_REQUESTS.name, "geo" => geo.to_string()).increment(1);

        self.ensure_cookies().await?;
        let (token, request) = self.explore(keywords, geo, timeframe).await?;
        self.widget_data(&token, &request, keywords.len()).await
    }
}

/// Strips the `)]}'` anti-JSON prefix the widget API puts before its body.
fn strip_json_prefix(body: &str) -> Result<&str, UpstreamError> {
    body.find('{').map(|start| &body[start..]).ok_or_else(|| {
        UpstreamError::MalformedResponse("no JSON object in response body".into())
    })
}

fn parse_epoch_seconds(time: &str) -> Result<RawTimestamp, UpstreamError> {
    let seconds: i64 = time
        .parse()
        .map_err(|_| UpstreamError::MalformedResponse(format!("bad timestamp {time:?}")))?;
    let instant = DateTime::<Utc>::from_timestamp(seconds, 0)
        .ok_or_else(|| UpstreamError::MalformedResponse(format!("timestamp out of range: {time}")))?;
    Ok(RawTimestamp::Utc(instant))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::get;
    use tokio::net::TcpListener;

    const EXPLORE_BODY: &str = concat!(
        ")]}'\n",
        r#"{"widgets":[
            {"id":"TIMESERIES","token":"APP6_UEAA","request":{"time":"2024-01-01 2025-01-01"}},
            {"id":"GEO_MAP","token":"other"}
        ]}"#
    );

    const WIDGETDATA_BODY: &str = concat!(
        ")]}',\n",
        r#"{"default":{"timelineData":[
            {"time":"1700000000","formattedTime":"Nov 14, 2023","value":[61,4],"isPartial":false},
            {"time":"1700604800","formattedTime":"Nov 21, 2023","value":[58,5]}
        ]}}"#
    );

    async fn serve(app: Router) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Url::parse(&format!("http://{addr}/")).unwrap()
    }

    fn client(base_url: Url) -> GoogleTrendsClient {
        GoogleTrendsClient::new(GoogleTrendsConfig {
            base_url,
            hl: "en-US".into(),
            tz: 360,
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    fn mock_upstream(explore_body: &'static str, widget_body: &'static str) -> Router {
        Router::new()
            .route("/", get(|| async { "ok" }))
            .route(
                "/trends/api/explore",
                get(move || async move { explore_body }),
            )
            .route(
                "/trends/api/widgetdata/multiline",
                get(move || async move { widget_body }),
            )
    }

    #[tokio::test]
    async fn test_interest_over_time() {
        let base_url = serve(mock_upstream(EXPLORE_BODY, WIDGETDATA_BODY)).await;
        let client = client(base_url);

        let keywords = vec!["Bitcoin".to_string(), "Ethereum".to_string()];
        let series = client
            .interest_over_time(&keywords, "US", "today 12-m")
            .await
            .unwrap();

        assert_eq!(series.rows.len(), 2);
        assert_eq!(
            series.rows[0].timestamp,
            RawTimestamp::Utc(DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap())
        );
        assert_eq!(series.rows[0].values, vec![61, 4]);
        assert_eq!(series.rows[1].values, vec![58, 5]);
    }

    #[tokio::test]
    async fn test_upstream_error_status() {
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .route(
                "/trends/api/explore",
                get(|| async { StatusCode::TOO_MANY_REQUESTS }),
            );
        let client = client(serve(app).await);

        let keywords = vec!["rust".to_string()];
        let err = client
            .interest_over_time(&keywords, "", "today 12-m")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            UpstreamError::Status(StatusCode::TOO_MANY_REQUESTS)
        ));
    }

    #[tokio::test]
    async fn test_missing_timeseries_widget() {
        let explore = ")]}'\n{\"widgets\":[{\"id\":\"GEO_MAP\",\"token\":\"x\"}]}";
        let client = client(serve(mock_upstream(explore, WIDGETDATA_BODY)).await);

        let keywords = vec!["rust".to_string()];
        let err = client
            .interest_over_time(&keywords, "US", "today 12-m")
            .await
            .unwrap_err();
        assert!(matches!(err, UpstreamError::MissingWidget));
    }

    #[tokio::test]
    async fn test_row_column_mismatch() {
        // Two keywords requested but rows carry a single value.
        let widget = ")]}',\n{\"default\":{\"timelineData\":[{\"time\":\"1700000000\",\"value\":[61]}]}}";
        let client = client(serve(mock_upstream(EXPLORE_BODY, widget)).await);

        let keywords = vec!["Bitcoin".to_string(), "Ethereum".to_string()];
        let err = client
            .interest_over_time(&keywords, "US", "today 12-m")
            .await
            .unwrap_err();
        assert!(matches!(err, UpstreamError::MalformedResponse(_)));
    }

    #[test]
    fn test_strip_json_prefix() {
        assert_eq!(strip_json_prefix(")]}'\n{\"a\":1}").unwrap(), "{\"a\":1}");
        assert_eq!(strip_json_prefix("{\"a\":1}").unwrap(), "{\"a\":1}");
        assert!(strip_json_prefix(")]}'").is_err());
    }

    #[test]
    fn test_parse_epoch_seconds() {
        assert_eq!(
            parse_epoch_seconds("1700000000").unwrap(),
            RawTimestamp::Utc(DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap())
        );
        assert!(parse_epoch_seconds("not-a-number").is_err());
    }
}
