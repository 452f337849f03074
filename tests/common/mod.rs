#![allow(dead_code)]

use bitslots::{Reel, Symbol, Window, WinRule};

/// Visit the window of every stop combination of `reels` exactly once.
pub fn for_each_window(reels: &[Reel], mut visit: impl FnMut(&Window)) {
    let mut stops = vec![0usize; reels.len()];
    loop {
        let slices = reels
            .iter()
            .zip(&stops)
            .map(|(reel, &stop)| reel.slice(stop).unwrap())
            .collect();
        visit(&Window::new(slices));

        let mut reel = 0;
        loop {
            if reel == reels.len() {
                return;
            }
            stops[reel] += 1;
            if stops[reel] < reels[reel].len() {
                break;
            }
            stops[reel] = 0;
            reel += 1;
        }
    }
}

/// (hit probability, expected multiplier) of one rule measured by running
/// the runtime evaluator over every stop combination.
pub fn exhaustive_figures(reels: &[Reel], rule: &WinRule, active_lines: usize) -> (f64, f64) {
    let total: u128 = reels.iter().map(|reel| reel.len() as u128).product();
    let mut hits = 0u128;
    let mut winnings = 0u128;
    for_each_window(reels, |window| {
        let win = rule.evaluate(window, active_lines).unwrap();
        if win > 0 {
            hits += 1;
        }
        winnings += win as u128;
    });
    (hits as f64 / total as f64, winnings as f64 / total as f64)
}

pub fn plain(names: &[&str]) -> Vec<Symbol> {
    names.iter().map(|n| Symbol::new(*n)).collect()
}

pub fn assert_close(actual: f64, expected: f64, context: &str) {
    assert!(
        (actual - expected).abs() < 1e-12,
        "{}: {} vs {}",
        context,
        actual,
        expected
    );
}
