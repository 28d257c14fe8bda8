//! Golden tests for the rendered page.
//!
//! These use insta inline snapshots so markup changes show up as a diff.
//! Run with `cargo insta review` to accept intentional changes.

use chrono::NaiveDate;

use crate::color::{ColorId, ColorTable};
use crate::event::{Attachment, CalendarEvent};
use crate::render::{PREAMBLE, event_block, render};
use crate::time::EventTime;

fn at(rfc3339: &str) -> EventTime {
    EventTime::parse_date_time(rfc3339).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> EventTime {
    EventTime::from_date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

/// A tournament with every optional field filled in.
fn tournament() -> CalendarEvent {
    CalendarEvent::new("golden", at("2025-03-05T18:00:00+10:00"))
        .with_end(at("2025-03-05T21:00:00+10:00"))
        .with_title("Club Doubles")
        .with_html_link("https://calendar.example/event?eid=abc")
        .with_location("Pins Bowl, 123 Main St")
        .with_description(r#"<p>Entries: <a href="https://tenpinresults.example/t/42">here</a></p>"#)
        .with_attachment(Attachment::new(
            "Oil Pattern.pdf",
            Some("https://drive.example/p".to_string()),
        ))
        .with_color(ColorId::Tomato)
}

#[test]
fn golden_full_event_block() {
    let block = event_block(0, &tournament(), &ColorTable::new());

    insta::assert_snapshot!(block, @r#"
    <div id="event-container-0" class="event-container">
    <div id="redirectBanner-event-container-0" class="redirect-banner">Redirecting, please ensure popups are enabled...</div>
    <li class="event" style="background-color: #d60000; color: #FFFFFF;">
    <div>05 Mar</div>
    <div><a href="https://calendar.example/event?eid=abc" style="text-decoration: none; color: inherit;" onclick="handleClick('https://calendar.example/event?eid=abc', 'event-container-0', event);">Club Doubles</a></div>
    <div><a href="http://maps.google.com/?q=Pins%20Bowl" onclick="handleClick('http://maps.google.com/?q=Pins%20Bowl', 'event-container-0', event);">Pins Bowl</a></div>
    <div class="icon-container"><a href="https://tenpinresults.example/t/42" target="_blank" onclick="handleClick('https://tenpinresults.example/t/42', 'event-container-0', event);"><img src="register.png" alt="Register" style="border:0;"></a><a href="https://drive.example/p" target="_blank" onclick="handleClick('https://drive.example/p', 'event-container-0', event);"><img src="pattern.png" alt="Pattern" style="border:0;"></a></div>
    </li>
    </div>
    "#);
}

#[test]
fn golden_two_month_listing() {
    let events = vec![
        CalendarEvent::new("a", date(2025, 3, 28))
            .with_end(date(2025, 3, 29))
            .with_title("Autumn Classic"),
        CalendarEvent::new("b", at("2025-04-02T19:00:00+10:00"))
            .with_end(at("2025-04-02T21:00:00+10:00"))
            .with_title("League Night")
            .with_location("")
            .with_color(ColorId::Banana),
    ];

    let page = render(&events, &ColorTable::new()).into_string();
    let body = page.strip_prefix(PREAMBLE).unwrap();

    insta::assert_snapshot!(body, @r#"
    <div class="month-separator"><h2>March 25</h2></div>
    <div id="event-container-0" class="event-container">
    <div id="redirectBanner-event-container-0" class="redirect-banner">Redirecting, please ensure popups are enabled...</div>
    <li class="event" style="background-color: #039be5; color: #FFFFFF;">
    <div>28 Mar to 29 Mar</div>
    <div>Autumn Classic</div>
    <div>No Location</div>
    </li>
    </div>
    <div class="month-separator"><h2>April 25</h2></div>
    <div id="event-container-1" class="event-container">
    <div id="redirectBanner-event-container-1" class="redirect-banner">Redirecting, please ensure popups are enabled...</div>
    <li class="event" style="background-color: #f6c026; color: #000000;">
    <div>02 Apr</div>
    <div>League Night</div>
    <div>No Location</div>
    </li>
    </div>
    </ul>
    </body>
    </html>
    "#);
}
