//! touch_log - a simulated game loop built with framehook.
//!
//! Each frame a "physics step" fires touch events on a few parts, then the
//! per-frame systems query what happened since the last frame:
//! - `use_event(&part, Part::Touched)` for owner events
//! - `use_event("score", &signal)` for a free-standing signal
//!
//! Run with `RUST_LOG=framehook_core=debug` to watch subscriptions come and go.

use framehook::prelude::*;

#[derive(Instance)]
struct Part {
    #[instance_id]
    id: InstanceId,
    name: &'static str,
    #[event]
    touched: Signal<(&'static str,)>,
}

impl Part {
    fn new(name: &'static str) -> Self {
        Self {
            id: InstanceId::new(),
            name,
            touched: Signal::new(),
        }
    }
}

/// Logs every touch on `part` since the previous frame.
fn touch_system(part: &Part) -> usize {
    let mut touches = 0;
    for (index, (who,)) in use_event(part, Part::Touched) {
        tracing::info!(part = part.name, index, who, "touched");
        touches += 1;
    }
    touches
}

fn score_system(scored: &Signal<(u32,)>) -> u32 {
    use_event("score", scored)
        .map(|(_, (points,))| points)
        .sum()
}

fn main() {
    framehook::init_tracing();

    let parts = [Part::new("door"), Part::new("lever"), Part::new("chest")];
    let scored = Signal::new();
    let mut total = 0;

    for frame in 0..6 {
        // Physics runs between frames and fires events.
        for (i, part) in parts.iter().enumerate() {
            if (frame + i) % 2 == 0 {
                part.touched.fire(("player",));
                scored.fire((10,));
            }
        }

        // The chest stops being simulated after frame 3, so its binding is torn down.
        let active = if frame < 3 { &parts[..] } else { &parts[..2] };

        let result = run_frame(|| {
            let touches: usize = active.iter().map(touch_system).sum();
            (touches, score_system(&scored))
        });

        match result {
            Ok((touches, points)) => {
                total += points;
                tracing::info!(frame, touches, points, total, "frame done");
            }
            Err(err) => {
                tracing::error!("frame failed: {}", err);
                break;
            }
        }
    }
}
