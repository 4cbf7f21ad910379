use spinwheel_game::{
    Continuation, HostEvent, MessageKind, Prize, ScriptedSource, SimHost, SimStep, SpinRequest,
    WheelConfig, WheelSession,
};
use std::time::Duration;

fn scripted(fillers: Vec<u8>) -> WheelSession<ScriptedSource> {
    WheelSession::with_source(WheelConfig::default(), ScriptedSource::new(fillers)).unwrap()
}

fn started(session: &mut WheelSession<impl spinwheel_game::RandomSource>) -> SimHost {
    let mut host = SimHost::new();
    session.start(&mut host);
    host
}

#[test]
fn cycle_position_wraps_every_ten_resolved_spins() {
    // Fillers never hit the bonus sector, so every press is exactly one spin.
    let mut session = scripted(vec![0, 1, 2, 4, 5, 6, 8, 10, 11, 12]);
    let mut host = started(&mut session);

    for spin in 1..=35_u64 {
        host.play_round(&mut session);
        let state = session.state();
        assert_eq!(state.spins_resolved, spin);
        assert_eq!(state.cycle_position, usize::try_from((spin - 1) % 10 + 1).unwrap());
        assert_eq!(state.cycle_wraps, (spin - 1) / 10);
        assert_eq!(
            session.machine().generator().generated(),
            1 + state.cycle_wraps,
            "exactly one regeneration per wrap"
        );
    }
}

#[test]
fn rotation_strictly_increases_across_rounds() {
    let mut session = WheelSession::new(WheelConfig::default(), 0xC0FFEE).unwrap();
    let mut host = started(&mut session);
    for _ in 0..60 {
        host.play_round(&mut session);
    }
    let rotations: Vec<f64> = host.rotations().collect();
    assert!(rotations.len() >= 60);
    for pair in rotations.windows(2) {
        assert!(pair[1] > pair[0], "rotation went from {} to {}", pair[0], pair[1]);
    }
    let last = rotations.last().copied().unwrap();
    assert!((session.state().cumulative_rotation - last).abs() < f64::EPSILON);
}

#[test]
fn landing_angle_matches_sector_under_pointer() {
    let mut session = WheelSession::new(WheelConfig::default(), 77).unwrap();
    let mut host = started(&mut session);
    for _ in 0..20 {
        let SpinRequest::Accepted(plan) = session.request_spin(&mut host) else {
            panic!("idle wheel must accept");
        };
        let resting = plan.rotation.rem_euclid(360.0);
        let expected = (360.0 - plan.sector.angle()).rem_euclid(360.0);
        assert!((resting - expected).abs() < 1e-9);
        host.run_until_idle(&mut session);
    }
}

#[test]
fn spin_request_while_spinning_has_no_effect() {
    let mut session = scripted(vec![0]);
    let mut host = started(&mut session);
    assert!(session.request_spin(&mut host).is_accepted());
    let state_before = session.state().clone();
    let events_before = host.events().len();
    let timers_before = host.pending_timers();

    assert_eq!(session.request_spin(&mut host), SpinRequest::Ignored);
    assert_eq!(session.state(), &state_before);
    assert_eq!(host.events().len(), events_before);
    assert_eq!(host.pending_timers(), timers_before);
}

#[test]
fn bonus_outside_sub_session_chains_three_spins() {
    // Position 0 is the bonus; positions 1..=3 then pay 30, 15 and sector 13 (45).
    let mut session = scripted(vec![9, 13, 0, 1, 2]);
    let mut host = started(&mut session);

    session.request_spin(&mut host);
    assert_eq!(host.run_timers(&mut session), 1);
    let announcement = host.open_message().cloned().expect("bonus popup");
    assert_eq!(announcement.kind, MessageKind::BonusAnnouncement);
    assert!(!session.state().free_spin_active);
    assert!(!host.spin_enabled());

    assert_eq!(host.dismiss(&mut session), Some(MessageKind::BonusAnnouncement));
    assert!(session.state().free_spin_active);
    assert!(session.state().free_spin_winnings.is_empty());
    assert!(!host.spin_enabled(), "control stays disabled while free spins chain");

    // No manual presses from here: timers alone run all three free spins.
    let mut fired = Vec::new();
    loop {
        match host.step(&mut session, false) {
            SimStep::Fired(continuation) => fired.push(continuation),
            SimStep::Dismissed(_) => unreachable!("auto dismiss is off"),
            SimStep::Idle => break,
        }
    }
    let free_spin_starts = fired
        .iter()
        .filter(|c| matches!(c, Continuation::FreeSpin { .. }))
        .count();
    assert_eq!(free_spin_starts, 3);
    assert_eq!(session.state().spins_resolved, 4);
    assert!(!session.state().free_spin_active);
    assert_eq!(
        session.state().free_spin_winnings.as_slice(),
        &[Prize::Amount(30), Prize::Amount(15), Prize::Amount(45)]
    );

    let total = host.open_message().cloned().expect("total popup");
    assert_eq!(total.kind, MessageKind::FreeSpinTotal);
    assert_eq!(total.amount, Some(90));
    assert_eq!(total.body, "Total winnings: 90лв!");

    // 5000 + 500 + 5000 + 1000 + 5000 + 1000 + 5000
    assert_eq!(host.now(), Duration::from_millis(22_500));

    host.dismiss(&mut session);
    assert!(session.state().free_spin_winnings.is_empty());
    assert!(host.spin_enabled());
    assert!(session.state().is_settled());
}

#[test]
fn every_cycle_opening_on_bonus_announces_again() {
    // Both cycles draw [9, 3, 7, 0, 3, 1, 3, 2, 7, 4].
    let mut session = scripted(vec![9, 0, 1, 2, 4, 9, 0, 1, 2, 4]);
    let mut host = started(&mut session);

    // Burn the first cycle: bonus round (4 spins) + 6 ordinary presses.
    host.play_round(&mut session);
    for _ in 0..6 {
        host.play_round(&mut session);
    }
    assert_eq!(session.state().cycle_position, 10);

    // Second cycle: bonus, then 30, 15 and sector 0.
    host.play_round(&mut session);
    let totals: Vec<u32> = host
        .messages()
        .filter(|m| m.kind == MessageKind::FreeSpinTotal)
        .filter_map(|m| m.amount)
        .collect();
    assert_eq!(totals, vec![145, 145]);

    let announcements = host
        .messages()
        .filter(|m| m.kind == MessageKind::BonusAnnouncement)
        .count();
    assert_eq!(announcements, 2);
}

#[test]
fn bonus_drawn_during_free_spins_counts_as_zero() {
    // Cycle [9, 3, 7, 9, 3, ...]: the third free spin lands on the bonus.
    let mut session = scripted(vec![9, 9, 0, 1, 2]);
    let mut host = started(&mut session);
    host.play_round(&mut session);

    let kinds: Vec<MessageKind> = host.messages().map(|m| m.kind).collect();
    assert_eq!(
        kinds,
        vec![MessageKind::BonusAnnouncement, MessageKind::FreeSpinTotal],
        "a bonus inside the sub-session must not announce again"
    );
    let total = host.messages().last().and_then(|m| m.amount);
    assert_eq!(total, Some(45));
    assert_eq!(session.state().spins_resolved, 4);
}

#[test]
fn ordinary_round_emits_expected_event_order() {
    let mut session = scripted(vec![0]);
    let mut host = started(&mut session);
    host.drain_events();

    host.play_round(&mut session);
    let tags: Vec<&'static str> = host
        .events()
        .iter()
        .map(|event| match event {
            HostEvent::SectorsRendered { .. } => "render",
            HostEvent::Rotated { .. } => "rotate",
            HostEvent::SpinEnabled { enabled: true, .. } => "enable",
            HostEvent::SpinEnabled { enabled: false, .. } => "disable",
            HostEvent::MessageShown { .. } => "show",
            HostEvent::Scheduled { .. } => "schedule",
            HostEvent::Fired { .. } => "fire",
            HostEvent::Dismissed { .. } => "dismiss",
        })
        .collect();
    assert_eq!(
        tags,
        vec!["disable", "rotate", "schedule", "fire", "show", "dismiss", "enable"]
    );
}
