//! End-to-end agent scenarios: input level changes and link conditions in,
//! HTTP reports and events out.

use crate::mock_hw::{boot, boot_with, run, REPORT_URL};

use doorwatch::app::events::{AppEvent, ReportTrigger};
use doorwatch::app::ports::ConnectionState;
use doorwatch::config::{AgentConfig, WireFormat};
use doorwatch::error::ConnectError;
use doorwatch::sensors::{DoorState, Transition};

const OPEN: &str = r#"{"state":"OPEN"}"#;
const CLOSED: &str = r#"{"state":"CLOSED"}"#;

// ── Boot ──────────────────────────────────────────────────────

#[test]
fn boot_sends_one_initial_report() {
    let (agent, io, sink) = boot(true);

    assert_eq!(agent.door_state(), DoorState::Open);
    assert_eq!(agent.connection_state(), ConnectionState::Connected);
    assert_eq!(io.http.bodies, vec![OPEN]);
    assert_eq!(io.http.urls, vec![REPORT_URL]);
    assert_eq!(sink.events[0], AppEvent::Started { state: DoorState::Open });
    assert!(sink.events.contains(&AppEvent::ReportDelivered {
        trigger: ReportTrigger::Initial,
        state: DoorState::Open,
        status: 200,
    }));
}

#[test]
fn unreadable_input_at_boot_assumes_closed() {
    let mut io = crate::mock_hw::mock_io(true);
    io.input.faulted = true;
    let mut sink = crate::mock_hw::RecordingSink::default();
    let agent = doorwatch::app::agent::Agent::start(
        AgentConfig::default(),
        &crate::mock_hw::network(),
        0,
        &mut io,
        &mut sink,
    )
    .unwrap();

    assert_eq!(agent.door_state(), DoorState::Closed);
    assert_eq!(io.http.last_body(), Some(CLOSED));
    assert!(sink.events.contains(&AppEvent::InputFault));
    assert_eq!(agent.stats().input_faults, 1);
}

// ── Debounce + edges ──────────────────────────────────────────

#[test]
fn high_to_low_held_past_window_reports_closed_once() {
    let (mut agent, mut io, mut sink) = boot(true);

    run(&mut agent, &mut io, &mut sink, 50, 950, 50);
    io.input.level = false;
    run(&mut agent, &mut io, &mut sink, 1_000, 1_600, 50);

    assert_eq!(agent.door_state(), DoorState::Closed);
    assert_eq!(io.http.bodies, vec![OPEN, CLOSED]);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::Transition(_))),
        1,
        "exactly one transition"
    );
    assert!(sink.events.contains(&AppEvent::Transition(Transition::Closed)));
}

#[test]
fn change_is_accepted_exactly_at_the_window_boundary() {
    let (mut agent, mut io, mut sink) = boot(true);
    io.input.level = false;

    let out = agent.tick(1_000, &mut io, &mut sink).unwrap();
    assert_eq!(out.transition, None);
    let out = agent.tick(1_499, &mut io, &mut sink).unwrap();
    assert_eq!(out.transition, None);
    let out = agent.tick(1_500, &mut io, &mut sink).unwrap();
    assert_eq!(out.transition, Some(Transition::Closed));
    assert_eq!(out.report, Some(ReportTrigger::Edge(Transition::Closed)));
}

#[test]
fn bounce_inside_window_produces_no_report() {
    let (mut agent, mut io, mut sink) = boot(true);

    io.input.level = false;
    agent.tick(1_000, &mut io, &mut sink).unwrap();
    io.input.level = true;
    run(&mut agent, &mut io, &mut sink, 1_100, 3_000, 50);

    assert_eq!(agent.door_state(), DoorState::Open);
    assert_eq!(io.http.bodies, vec![OPEN]);
    assert_eq!(agent.stats().transitions, 0);
}

#[test]
fn open_close_open_reports_every_settled_change() {
    let (mut agent, mut io, mut sink) = boot(false);

    io.input.level = true;
    run(&mut agent, &mut io, &mut sink, 1_000, 2_000, 50);
    io.input.level = false;
    run(&mut agent, &mut io, &mut sink, 2_050, 3_000, 50);
    io.input.level = true;
    run(&mut agent, &mut io, &mut sink, 3_050, 4_000, 50);

    assert_eq!(io.http.bodies, vec![CLOSED, OPEN, CLOSED, OPEN]);
    assert_eq!(agent.stats().transitions, 3);
}

#[test]
fn input_fault_mid_run_keeps_last_state() {
    let (mut agent, mut io, mut sink) = boot(true);

    io.input.faulted = true;
    let out = agent.tick(1_000, &mut io, &mut sink).unwrap();
    assert_eq!(out.state, DoorState::Open);
    assert_eq!(out.report, None);
    assert_eq!(agent.stats().input_faults, 1);
}

#[test]
fn inverted_polarity_maps_low_to_open() {
    let config = AgentConfig {
        open_level: false,
        ..Default::default()
    };
    let (agent, io, _sink) = boot_with(config, false);
    assert_eq!(agent.door_state(), DoorState::Open);
    assert_eq!(io.http.last_body(), Some(OPEN));
}

// ── Heartbeat ─────────────────────────────────────────────────

#[test]
fn two_heartbeat_intervals_send_exactly_two_heartbeats() {
    let (mut agent, mut io, mut sink) = boot(true);

    run(&mut agent, &mut io, &mut sink, 1_000, 120_000, 1_000);

    let heartbeats = sink.count(|e| {
        matches!(
            e,
            AppEvent::ReportDelivered {
                trigger: ReportTrigger::Heartbeat,
                ..
            }
        )
    });
    assert_eq!(heartbeats, 2);
    assert_eq!(io.http.bodies, vec![OPEN, OPEN, OPEN]);
}

#[test]
fn edge_report_rearms_the_heartbeat() {
    let (mut agent, mut io, mut sink) = boot(true);

    io.input.level = false;
    run(&mut agent, &mut io, &mut sink, 30_000, 90_000, 500);
    // Edge accepted at 30 500; no heartbeat until 90 500.
    assert_eq!(io.http.bodies, vec![OPEN, CLOSED]);

    let out = agent.tick(90_500, &mut io, &mut sink).unwrap();
    assert_eq!(out.report, Some(ReportTrigger::Heartbeat));
    assert_eq!(io.http.last_body(), Some(CLOSED));
}

#[test]
fn edge_and_heartbeat_due_together_send_one_report() {
    let (mut agent, mut io, mut sink) = boot(true);

    io.input.level = false;
    agent.tick(59_500, &mut io, &mut sink).unwrap();
    let out = agent.tick(60_000, &mut io, &mut sink).unwrap();

    assert_eq!(out.report, Some(ReportTrigger::Edge(Transition::Closed)));
    assert_eq!(io.http.bodies.len(), 2);
    assert_eq!(agent.tick(60_050, &mut io, &mut sink).unwrap().report, None);
}

// ── Connectivity ──────────────────────────────────────────────

#[test]
fn dropped_link_is_reestablished_before_reporting() {
    let (mut agent, mut io, mut sink) = boot(true);

    io.link.drop_link();
    io.input.level = false;
    run(&mut agent, &mut io, &mut sink, 1_000, 1_500, 50);

    assert_eq!(io.http.last_body(), Some(CLOSED));
    assert_eq!(agent.reconnects(), 1);
    assert!(sink.events.contains(&AppEvent::LinkLost));
}

#[test]
fn exhausted_reconnects_are_fatal_and_stop_reporting() {
    let (mut agent, mut io, mut sink) = boot(true);
    let delays_before = io.delay.total_ms;

    io.link.kill();
    io.input.level = false;
    run(&mut agent, &mut io, &mut sink, 1_000, 1_450, 50);
    let result = agent.tick(1_500, &mut io, &mut sink);

    assert_eq!(result, Err(ConnectError::RetriesExhausted { attempts: 10 }));
    assert_eq!(io.link.connect_calls, 10);
    assert_eq!(io.delay.total_ms - delays_before, 10_000);
    assert_eq!(agent.connection_state(), ConnectionState::Failed);
    assert!(sink.events.contains(&AppEvent::LinkFailed { attempts: 10 }));

    // Nothing more goes out, even on the next heartbeat.
    assert!(agent.tick(61_500, &mut io, &mut sink).is_err());
    assert_eq!(io.http.bodies, vec![OPEN]);
}

#[test]
fn link_that_never_comes_up_fails_the_boot() {
    let mut io = crate::mock_hw::mock_io(true);
    io.link.up_after = None;
    let mut sink = crate::mock_hw::RecordingSink::default();

    let result = doorwatch::app::agent::Agent::start(
        AgentConfig::default(),
        &crate::mock_hw::network(),
        0,
        &mut io,
        &mut sink,
    );
    assert!(result.is_err());
    assert_eq!(io.http.opens, 0);
}

// ── Reporter failures ─────────────────────────────────────────

#[test]
fn post_error_closes_the_session_and_is_not_retried() {
    let (mut agent, mut io, mut sink) = boot(true);
    io.http.fail_post = true;

    io.input.level = false;
    run(&mut agent, &mut io, &mut sink, 1_000, 2_000, 50);

    assert_eq!(io.http.opens, 2);
    assert_eq!(io.http.closes, 2);
    assert!(!io.http.is_active());
    assert_eq!(agent.stats().reports_failed, 1);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::ReportFailed { .. })),
        1
    );
}

#[test]
fn open_error_leaks_no_session() {
    let (mut agent, mut io, mut sink) = boot(true);
    io.http.fail_open = true;

    io.input.level = false;
    run(&mut agent, &mut io, &mut sink, 1_000, 1_500, 50);

    assert_eq!(io.http.opens, io.http.closes);
    assert!(!io.http.is_active());
    assert!(sink.events.iter().any(|e| matches!(
        e,
        AppEvent::ReportFailed {
            trigger: ReportTrigger::Edge(Transition::Closed),
            ..
        }
    )));
}

#[test]
fn server_error_status_still_counts_as_delivered() {
    let (mut agent, mut io, mut sink) = boot(true);
    io.http.status = 500;

    io.input.level = false;
    run(&mut agent, &mut io, &mut sink, 1_000, 1_500, 50);

    assert_eq!(agent.stats().reports_delivered, 2);
    assert_eq!(agent.stats().reports_failed, 0);
    assert!(sink.events.contains(&AppEvent::ReportDelivered {
        trigger: ReportTrigger::Edge(Transition::Closed),
        state: DoorState::Closed,
        status: 500,
    }));
}

#[test]
fn shop_status_format_is_sent_when_configured() {
    let config = AgentConfig {
        wire_format: WireFormat::ShopStatus,
        ..Default::default()
    };
    let (_agent, io, _sink) = boot_with(config, true);
    assert_eq!(io.http.last_body(), Some(r#"{"shop-status":"OPEN"}"#));
}
