//! Google Calendar API client.
//!
//! Thin HTTP layer over `events.list`: builds the request, maps statuses to
//! [`ProviderError`] codes and converts API events into [`CalendarEvent`]s.

use chrono::SecondsFormat;
use eventboard_core::{Attachment, CalendarEvent, ColorId, EventTime};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{ProviderError, ProviderResult};
use crate::provider::{EventPage, PageRequest};

use super::config::GoogleConfig;

const PROVIDER: &str = "google";

/// Google Calendar API client.
///
/// Stateless apart from the connection pool; the access token is passed per
/// request so the caller owns refresh.
#[derive(Debug, Clone)]
pub struct GoogleCalendarClient {
    http_client: reqwest::Client,
    api_base: String,
}

impl GoogleCalendarClient {
    pub fn new(config: &GoogleConfig) -> ProviderResult<Self> {
        Ok(Self {
            http_client: config.http_client()?,
            api_base: config.api_base.clone(),
        })
    }

    /// Fetches one page of upcoming events.
    ///
    /// Recurring events are expanded into instances and ordered by start
    /// time.
    pub async fn list_events_page(
        &self,
        access_token: &str,
        request: &PageRequest,
    ) -> ProviderResult<EventPage> {
        let url = format!(
            "{}/calendars/{}/events",
            self.api_base,
            urlencoding::encode(&request.calendar_id)
        );

        let mut query = vec![
            (
                "timeMin",
                request.time_min.to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
            ("singleEvents", "true".to_string()),
            ("orderBy", "startTime".to_string()),
        ];
        if let Some(token) = &request.page_token {
            query.push(("pageToken", token.clone()));
        }

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(access_token)
            .query(&query)
            .send()
            .await
            .map_err(|e| {
                let message = if e.is_timeout() {
                    "request timeout".to_string()
                } else if e.is_connect() {
                    format!("connection failed: {}", e)
                } else {
                    format!("request failed: {}", e)
                };
                ProviderError::network(message)
                    .with_provider(PROVIDER)
                    .with_source(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok());
            let body = response.text().await.unwrap_or_default();
            return Err(error_for_status(status, retry_after, &body));
        }

        let body = response.text().await.map_err(|e| {
            ProviderError::network("failed to read response")
                .with_provider(PROVIDER)
                .with_source(e)
        })?;

        let list: EventListResponse = serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response("failed to parse events response")
                .with_provider(PROVIDER)
                .with_source(e)
        })?;

        let items: Vec<CalendarEvent> = list.items.into_iter().filter_map(convert_event).collect();
        debug!(
            calendar = %request.calendar_id,
            events = items.len(),
            more = list.next_page_token.is_some(),
            "listed events page"
        );

        Ok(EventPage {
            items,
            next_page_token: list.next_page_token.filter(|t| !t.is_empty()),
        })
    }
}

/// Maps a non-success status to the matching error code.
fn error_for_status(status: StatusCode, retry_after: Option<u64>, body: &str) -> ProviderError {
    let err = match status {
        StatusCode::UNAUTHORIZED => {
            ProviderError::authentication("access token expired or invalid")
        }
        StatusCode::FORBIDDEN => ProviderError::authorization(format!(
            "access denied to calendar: {}",
            body
        )),
        StatusCode::TOO_MANY_REQUESTS => ProviderError::rate_limited(format!(
            "rate limit exceeded{}",
            retry_after
                .map(|s| format!(", retry after {} seconds", s))
                .unwrap_or_default()
        )),
        _ => ProviderError::server(format!("API error ({}): {}", status, body)),
    };
    err.with_provider(PROVIDER)
}

/// Converts an API event, dropping fields that fail to parse.
///
/// Only an event without an id is skipped entirely.
fn convert_event(event: ApiEvent) -> Option<CalendarEvent> {
    let Some(id) = event.id else {
        warn!("skipping event without id");
        return None;
    };

    let start = event.start.and_then(|t| parse_time(t, &id, "start"));
    let end = event.end.and_then(|t| parse_time(t, &id, "end"));

    let attachments = event
        .attachments
        .into_iter()
        .map(|a| Attachment::new(a.title.unwrap_or_default(), a.file_url))
        .collect();

    Some(CalendarEvent {
        id,
        title: event.summary,
        start,
        end,
        location: event.location,
        description: event.description,
        html_link: event.html_link,
        color_id: event.color_id.as_deref().map(ColorId::parse),
        attachments,
    })
}

fn parse_time(time: ApiEventTime, event_id: &str, field: &str) -> Option<EventTime> {
    if let Some(dt) = time.date_time {
        return EventTime::parse_date_time(&dt)
            .map_err(|e| warn!(event = event_id, field, value = %dt, error = %e, "unparseable event time"))
            .ok();
    }
    if let Some(date) = time.date {
        return EventTime::parse_date(&date)
            .map_err(|e| warn!(event = event_id, field, value = %date, error = %e, "unparseable event date"))
            .ok();
    }
    None
}

/// Response from the events.list endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventListResponse {
    #[serde(default)]
    items: Vec<ApiEvent>,
    next_page_token: Option<String>,
}

/// A single event from the Google Calendar API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEvent {
    id: Option<String>,
    summary: Option<String>,
    description: Option<String>,
    location: Option<String>,
    start: Option<ApiEventTime>,
    end: Option<ApiEventTime>,
    html_link: Option<String>,
    color_id: Option<String>,
    #[serde(default)]
    attachments: Vec<ApiAttachment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEventTime {
    date: Option<String>,
    date_time: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiAttachment {
    title: Option<String>,
    file_url: Option<String>,
}
