//! The payback engine's closed-form probabilities against brute force
//!
//! Every formula in the engine is checked here by enumerating every stop
//! combination of small reel sets and running the same evaluators the spin
//! path uses. Both sides are exact rationals over the same denominator, so
//! the comparisons are essentially equality.

mod common;

use common::{assert_close, exhaustive_figures, for_each_window, plain};

use bitslots::{
    target_counts, LeftPay, LinePay, PaybackDiagnostic, PaybackEngine, Reel, ScatterPay, Symbol,
    WinRule, WinWays,
};

fn joker() -> Symbol {
    Symbol::wild("joker", ["scale"])
}

/// Three single-row reels mixing a wild (which refuses to stand in for
/// scale) with plain symbols, at unequal lengths.
fn line_reels() -> Vec<Reel> {
    let joker = joker();
    let strips = vec![
        vec![Symbol::new("bell"), joker.clone(), Symbol::new("plum"), Symbol::new("scale")],
        vec![
            Symbol::new("bell"),
            Symbol::new("bell"),
            joker.clone(),
            Symbol::new("plum"),
            Symbol::new("scale"),
        ],
        vec![joker, Symbol::new("plum"), Symbol::new("scale"), Symbol::new("plum")],
    ];
    strips
        .into_iter()
        .map(|strip| Reel::with_window(strip, 1).unwrap())
        .collect()
}

fn line3() -> Vec<Vec<usize>> {
    vec![vec![0, 0, 0]]
}

#[test]
fn left_pay_formula_matches_brute_force_at_every_length() {
    let reels = line_reels();
    for n in 1..=3 {
        let rule = WinRule::Left(LeftPay::new(Symbol::new("bell"), n, 40, line3()).unwrap());
        let counts = target_counts(&reels, rule.symbol());
        let figures = match &rule {
            WinRule::Left(r) => r.payback(&counts).unwrap(),
            _ => unreachable!(),
        };
        let (hit, expected) = exhaustive_figures(&reels, &rule, 1);
        assert_close(figures.hit_probability, hit, &format!("left {} hit", n));
        assert_close(figures.expected_return, expected, &format!("left {} return", n));
    }
}

#[test]
fn left_pay_formula_holds_for_a_wild_target() {
    // The wild's own rule: its symbols are direct matches, so the all-wild
    // subtraction must not fire.
    let reels = line_reels();
    let rule = WinRule::Left(LeftPay::new(joker(), 2, 100, line3()).unwrap());
    let counts = target_counts(&reels, rule.symbol());
    let figures = match &rule {
        WinRule::Left(r) => r.payback(&counts).unwrap(),
        _ => unreachable!(),
    };
    let (hit, expected) = exhaustive_figures(&reels, &rule, 1);
    assert_close(figures.hit_probability, hit, "wild-target left hit");
    assert_close(figures.expected_return, expected, "wild-target left return");
}

#[test]
fn left_pay_formula_holds_for_an_excluded_target() {
    // Scale is on every strip but the wild never stands in for it.
    let reels = line_reels();
    let rule = WinRule::Left(LeftPay::new(Symbol::new("scale"), 1, 10, line3()).unwrap());
    let counts = target_counts(&reels, rule.symbol());
    let figures = match &rule {
        WinRule::Left(r) => r.payback(&counts).unwrap(),
        _ => unreachable!(),
    };
    let (hit, expected) = exhaustive_figures(&reels, &rule, 1);
    assert_close(figures.hit_probability, hit, "excluded-target left hit");
    assert_close(figures.expected_return, expected, "excluded-target left return");
}

#[test]
fn line_pay_formula_matches_brute_force() {
    let reels = line_reels();
    for (symbol, pays) in [
        (Symbol::new("bell"), vec![1, 2, 5]),
        (Symbol::new("plum"), vec![0, 3, 9]),
        (Symbol::new("scale"), vec![1, 3, 9]),
    ] {
        let label = symbol.name().to_string();
        let rule = WinRule::Line(LinePay::new(symbol, pays, line3()).unwrap());
        let counts = target_counts(&reels, rule.symbol());
        let figures = match &rule {
            WinRule::Line(r) => r.payback(&counts).unwrap(),
            _ => unreachable!(),
        };
        let (hit, expected) = exhaustive_figures(&reels, &rule, 1);
        assert_close(figures.hit_probability, hit, &format!("line {} hit", label));
        assert_close(figures.expected_return, expected, &format!("line {} return", label));
    }
}

#[test]
fn ways_enumeration_matches_brute_force_with_stacked_symbols() {
    // Window of 2 with adjacent bells: stacked occurrences multiply ways.
    let joker = joker();
    let strips = vec![
        plain(&["bell", "bell", "plum"]),
        vec![Symbol::new("plum"), Symbol::new("bell"), Symbol::new("scale")],
        vec![joker, Symbol::new("plum"), Symbol::new("plum")],
    ];
    let reels: Vec<Reel> = strips
        .into_iter()
        .map(|strip| Reel::with_window(strip, 2).unwrap())
        .collect();

    let rule = WinRule::Ways(WinWays::new(Symbol::new("bell"), vec![1, 5, 20]).unwrap());
    let figures = match &rule {
        WinRule::Ways(r) => r.payback(&reels).unwrap(),
        _ => unreachable!(),
    };
    let (hit, expected) = exhaustive_figures(&reels, &rule, 1);
    assert_close(figures.hit_probability, hit, "ways hit");
    assert_close(figures.expected_return, expected, "ways return");
}

#[test]
fn ways_unreachable_target_reports_a_diagnostic_and_zero() {
    // No scale on reel 0 and the wild refuses to cover it.
    let strips = vec![
        plain(&["bell", "bell", "plum"]),
        plain(&["plum", "bell", "scale"]),
        plain(&["scale", "plum", "plum"]),
    ];
    let reels: Vec<Reel> = strips
        .into_iter()
        .map(|strip| Reel::with_window(strip, 2).unwrap())
        .collect();
    let rule = WinRule::Ways(WinWays::new(Symbol::new("scale"), vec![2, 7, 30]).unwrap());

    let (hit, expected) = exhaustive_figures(&reels, &rule, 1);
    assert_eq!(hit, 0.0);
    assert_eq!(expected, 0.0);

    let report = PaybackEngine::new().compute_rtp(&reels, &[rule], 1).unwrap();
    assert_eq!(report.rules[0].rtp_contribution, 0.0);
    assert_eq!(
        report.rules[0].diagnostic,
        Some(PaybackDiagnostic::UnreachableSymbol {
            symbol: "scale".to_string(),
            reel: 0
        })
    );
}

#[test]
fn scatter_formula_matches_brute_force_on_spaced_strips() {
    // Cherries at least a window apart, so the stop-counting model is
    // exact and runtime occurrence counts equal scattering-reel counts.
    let strips = vec![
        plain(&["cherry", "x", "y", "cherry", "z", "w"]),
        plain(&["x", "cherry", "y", "z", "cherry", "w"]),
        plain(&["x", "y", "cherry", "z", "w", "v"]),
    ];
    let reels: Vec<Reel> = strips
        .into_iter()
        .map(|strip| Reel::with_window(strip, 2).unwrap())
        .collect();

    let rule = WinRule::Scatter(ScatterPay::new(Symbol::new("cherry"), vec![0, 5, 25]).unwrap());
    let counts = target_counts(&reels, rule.symbol());
    let figures = match &rule {
        WinRule::Scatter(r) => r.payback(&counts).unwrap(),
        _ => unreachable!(),
    };
    let (hit, expected) = exhaustive_figures(&reels, &rule, 1);
    assert_close(figures.hit_probability, hit, "scatter hit");
    assert_close(figures.expected_return, expected, "scatter return");
}

#[test]
fn engine_total_matches_exhaustive_spin_average() {
    // The round-trip guarantee in exact form: summing the runtime win of a
    // whole rule set over every window equals the engine's aggregate RTP.
    let reels = line_reels();
    let rules = vec![
        WinRule::Line(LinePay::new(Symbol::new("bell"), vec![1, 2, 5], line3()).unwrap()),
        WinRule::Left(LeftPay::new(Symbol::new("plum"), 2, 15, line3()).unwrap()),
        WinRule::Scatter(ScatterPay::new(Symbol::new("bell"), vec![1, 2, 4]).unwrap()),
    ];

    let total: u128 = reels.iter().map(|reel| reel.len() as u128).product();
    let mut winnings = 0u128;
    for_each_window(&reels, |window| {
        for rule in &rules {
            winnings += rule.evaluate(window, 1).unwrap() as u128;
        }
    });
    let exhaustive_rtp = winnings as f64 / total as f64;

    let report = PaybackEngine::new().compute_rtp(&reels, &rules, 1).unwrap();
    assert_close(report.total_rtp, exhaustive_rtp, "aggregate rtp");
}
