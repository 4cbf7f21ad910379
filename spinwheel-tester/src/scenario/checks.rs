//! Property checks run by each scenario against a freshly seeded wheel.

use anyhow::{Context, Result, ensure};
use spinwheel_game::constants::{CYCLE_LEN, DEGREES_PER_TURN, TOTAL_SECTORS};
use spinwheel_game::{
    CYCLE_LAYOUT, Continuation, MessageKind, RandomSource, ScriptedSource, SectorIndex,
    SectorTable, SequenceGenerator, SimHost, SimStep, Slot, SpinRequest, WheelRng, WheelSession,
};

use super::ScenarioCtx;

/// Minimum number of cycles drawn for the uniformity check.
const UNIFORMITY_MIN_CYCLES: usize = 2_000;
/// Far beyond the 0.01% critical value for 15 degrees of freedom.
const CHI_SQUARE_LIMIT: f64 = 60.0;

fn started_session(ctx: &ScenarioCtx) -> Result<(WheelSession, SimHost)> {
    let mut session = WheelSession::new(ctx.config.clone(), ctx.seed)?;
    let mut host = SimHost::new();
    session.start(&mut host);
    Ok((session, host))
}

pub fn smoke(ctx: &ScenarioCtx) -> Result<()> {
    let (mut session, mut host) = started_session(ctx)?;
    ensure!(
        host.labels().len() == usize::from(TOTAL_SECTORS),
        "expected {TOTAL_SECTORS} labels, rendered {}",
        host.labels().len()
    );
    ensure!(host.spin_enabled(), "spin control disabled after start");

    for press in 1..=ctx.spins {
        let request = host.play_round(&mut session);
        ensure!(request.is_accepted(), "press {press} was ignored on an idle wheel");
        ensure!(
            session.state().is_settled(),
            "press {press} left the wheel unsettled: {:?}",
            session.state().phase()
        );
        ensure!(host.spin_enabled(), "press {press} left the control disabled");
    }

    for message in host.messages() {
        if message.kind != MessageKind::BonusAnnouncement {
            ensure!(
                message.amount.is_some(),
                "{:?} popup has no amount",
                message.kind
            );
        }
    }
    if ctx.verbose {
        println!(
            "    smoke: {} spins resolved, {} popups",
            session.state().spins_resolved,
            host.messages().count()
        );
    }
    Ok(())
}

pub fn pity_layout(ctx: &ScenarioCtx) -> Result<()> {
    let pity = ctx.config.pity.sectors()?;
    let table = SectorTable::global();
    let mut generator = SequenceGenerator::seeded(pity, ctx.seed);

    for cycle in 0..ctx.spins.max(1) {
        let sequence = generator.generate();
        for (position, slot) in CYCLE_LAYOUT.iter().enumerate() {
            let sector = sequence
                .get(position)
                .with_context(|| format!("cycle {cycle} is missing position {position}"))?;
            match pity.for_slot(*slot) {
                Some(expected) => ensure!(
                    sector == expected,
                    "cycle {cycle} position {position}: expected pity {expected}, got {sector}"
                ),
                None => ensure!(
                    !pity.contains(sector),
                    "cycle {cycle} filler {position} drew pity sector {sector} ({})",
                    table.prize(sector)
                ),
            }
        }
    }
    Ok(())
}

pub fn filler_uniformity(ctx: &ScenarioCtx) -> Result<()> {
    let pity = ctx.config.pity.sectors()?;
    let mut generator = SequenceGenerator::seeded(pity, ctx.seed);
    let mut counts = [0_u32; TOTAL_SECTORS as usize];
    let cycles = ctx.spins.max(UNIFORMITY_MIN_CYCLES);

    for _ in 0..cycles {
        for sector in generator.generate().fillers() {
            counts[sector.as_usize()] += 1;
        }
    }

    let eligible: Vec<SectorIndex> = SectorIndex::all().filter(|i| !pity.contains(*i)).collect();
    let draws: u32 = counts.iter().sum();
    let expected = f64::from(draws) / f64::from(u32::try_from(eligible.len())?);
    let chi_square: f64 = eligible
        .iter()
        .map(|index| {
            let observed = f64::from(counts[index.as_usize()]);
            (observed - expected).powi(2) / expected
        })
        .sum();

    let filler_slots = CYCLE_LAYOUT.iter().filter(|s| **s == Slot::Filler).count();
    ensure!(
        draws == u32::try_from(cycles * filler_slots)?,
        "expected {} filler draws, counted {draws}",
        cycles * filler_slots
    );
    ensure!(
        chi_square < CHI_SQUARE_LIMIT,
        "filler chi-square {chi_square:.2} over {draws} draws: {counts:?}"
    );
    if ctx.verbose {
        println!("    uniformity: chi-square {chi_square:.2} over {draws} draws");
    }
    Ok(())
}

pub fn cycle_wrap(ctx: &ScenarioCtx) -> Result<()> {
    let (mut session, mut host) = started_session(ctx)?;
    for press in 1..=ctx.spins {
        host.play_round(&mut session);
        let state = session.state();
        let resolved = state.spins_resolved;
        ensure!(resolved > 0, "press {press} resolved nothing");
        ensure!(
            (1..=CYCLE_LEN).contains(&state.cycle_position),
            "cycle position {} out of range after press {press}",
            state.cycle_position
        );
        ensure!(
            state.cycle_wraps == (resolved - 1) / CYCLE_LEN as u64,
            "{resolved} resolved spins but {} wraps",
            state.cycle_wraps
        );
        let generated = session.machine().generator().generated();
        ensure!(
            generated == 1 + state.cycle_wraps,
            "{generated} cycles drawn for {} wraps",
            state.cycle_wraps
        );
    }
    Ok(())
}

pub fn rotation_monotonic(ctx: &ScenarioCtx) -> Result<()> {
    let (mut session, mut host) = started_session(ctx)?;
    for _ in 0..ctx.spins {
        host.play_round(&mut session);
    }

    let turns = f64::from(ctx.config.full_turns);
    let min_step = (turns - 1.0) * DEGREES_PER_TURN;
    let max_step = (turns + 1.0) * DEGREES_PER_TURN;
    let mut previous = 0.0;
    for (spin, rotation) in host.rotations().enumerate() {
        let step = rotation - previous;
        ensure!(
            step > min_step && step <= max_step,
            "spin {spin}: rotation moved {step}deg ({previous} -> {rotation})"
        );
        previous = rotation;
    }
    ensure!(
        (session.state().cumulative_rotation - previous).abs() < f64::EPSILON,
        "session rotation {} drifted from last target {previous}",
        session.state().cumulative_rotation
    );
    Ok(())
}

pub fn spin_guard(ctx: &ScenarioCtx) -> Result<()> {
    let (mut session, mut host) = started_session(ctx)?;
    for press in 1..=ctx.spins {
        ensure!(
            session.request_spin(&mut host).is_accepted(),
            "press {press} rejected on an idle wheel"
        );
        let before = session.state().clone();
        let timers = host.pending_timers();
        ensure!(
            session.request_spin(&mut host) == SpinRequest::Ignored,
            "second press {press} accepted mid-spin"
        );
        ensure!(
            session.state() == &before,
            "ignored press {press} changed the session"
        );
        ensure!(
            host.pending_timers() == timers,
            "ignored press {press} scheduled a timer"
        );
        host.run_until_idle(&mut session);
    }
    Ok(())
}

pub fn free_spins(ctx: &ScenarioCtx) -> Result<()> {
    let bonus = SectorTable::global()
        .bonus_sector()
        .context("wheel has no bonus sector")?;
    ensure!(
        !ctx.config.pity.sectors()?.contains(bonus),
        "bonus sector {bonus} is configured as a pity sector"
    );

    // Force the first filler onto the bonus, then follow the seeded stream.
    let mut rng = WheelRng::from_user_seed(ctx.seed);
    let mut script = vec![bonus.get()];
    script.extend((0..32).map(|_| rng.draw_below(TOTAL_SECTORS)));
    script.extend(SectorIndex::all().map(SectorIndex::get));
    let mut session = WheelSession::with_source(ctx.config.clone(), ScriptedSource::new(script))?;
    let mut host = SimHost::new();
    session.start(&mut host);

    session.request_spin(&mut host);
    host.run_timers(&mut session);
    let kind = host.open_message().map(|m| m.kind);
    ensure!(
        kind == Some(MessageKind::BonusAnnouncement),
        "expected the bonus announcement, found {kind:?}"
    );
    host.dismiss(&mut session);
    ensure!(
        session.state().free_spin_active,
        "sub-session did not open"
    );

    let table = SectorTable::global();
    let mut settled = Vec::new();
    loop {
        match host.step(&mut session, false) {
            SimStep::Fired(Continuation::SettleSpin { sector }) => settled.push(sector),
            SimStep::Fired(Continuation::FreeSpin { .. }) => {}
            SimStep::Dismissed(_) | SimStep::Idle => break,
        }
    }

    let count = ctx.config.free_spin_count;
    ensure!(
        settled.len() == count,
        "expected {count} free spins, settled {}",
        settled.len()
    );
    let expected: u32 = settled.iter().map(|s| table.prize(*s).amount()).sum();
    let total = host
        .open_message()
        .filter(|m| m.kind == MessageKind::FreeSpinTotal)
        .and_then(|m| m.amount)
        .context("total popup missing after the sub-session")?;
    ensure!(
        total == expected,
        "total popup shows {total}, free spins paid {expected}"
    );
    ensure!(!host.spin_enabled(), "control enabled before the total closed");

    host.dismiss(&mut session);
    ensure!(session.state().is_settled(), "wheel unsettled after the total");
    ensure!(host.spin_enabled(), "control still disabled after the total");
    ensure!(
        session.state().free_spin_winnings.is_empty(),
        "winnings not cleared"
    );
    Ok(())
}
