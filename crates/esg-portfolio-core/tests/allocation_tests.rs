use esg_portfolio_core::allocation::constraints::build;
use esg_portfolio_core::allocation::portfolio::{get_portfolio, optimize_portfolio, PortfolioInput};
use esg_portfolio_core::allocation::preferences::{resolve, RawChoices};
use esg_portfolio_core::allocation::solver::{solve, SolveStatus};
use esg_portfolio_core::allocation::universe::Stock;
use esg_portfolio_core::{FormulationConfig, PortfolioError};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Fixtures
// ===========================================================================

fn stock(name: &str, r10: Decimal, vol: Decimal, beta: Decimal, esg: Decimal) -> Stock {
    Stock {
        name: name.into(),
        return_1y: r10 / dec!(3),
        return_5y: r10 / dec!(2),
        return_10y: r10,
        volatility: vol,
        beta,
        esg,
    }
}

/// Twelve stocks topped by GABILNEquity.
///
/// Seven stocks sit at the 0.10 cap and four share the remaining 0.30, so the
/// volatility ceiling, ESG floor and beta floor all bind at the optimum:
/// volatility 1.00, ESG 6.00, beta 0.75, return 35.27. BAYNGY is left out.
fn gabiln_universe() -> Vec<Stock> {
    vec![
        stock("GABILNEquity", dec!(70.54), dec!(0.86), dec!(0.41), dec!(5.55)),
        stock("NOVOBDCEquity", dec!(41.62), dec!(0.95), dec!(0.62), dec!(6.40)),
        stock("ASMLNAEquity", dec!(50.50), dec!(1.10), dec!(0.95), dec!(6.20)),
        stock("SAPGYEquity", dec!(37.285), dec!(0.98), dec!(0.88), dec!(6.05)),
        stock("NESNSWEquity", dec!(31.92), dec!(0.72), dec!(0.55), dec!(6.80)),
        stock("ROGSWEquity", dec!(35.15), dec!(0.90), dec!(0.70), dec!(6.30)),
        stock("RMSFPEquity", dec!(65.999), dec!(1.255), dec!(0.804), dec!(5.78)),
        stock("SIEGYEquity", dec!(6.25), dec!(1.05), dec!(0.80), dec!(5.90)),
        stock("ALVGYEquity", dec!(7.42), dec!(1.20), dec!(0.92), dec!(5.40)),
        stock("UNANAEquity", dec!(4.18), dec!(0.80), dec!(0.68), dec!(6.60)),
        stock("TTEFPEquity", dec!(8.22), dec!(1.25), dec!(1.02), dec!(4.80)),
        stock("BAYNGYEquity", dec!(0.20), dec!(1.40), dec!(1.10), dec!(4.20)),
    ]
}

/// Twelve stocks with identical risk attributes and returns 1..=12.
fn ladder_universe() -> Vec<Stock> {
    (1..=12)
        .map(|i| {
            stock(
                &format!("S{i:02}"),
                Decimal::from(i),
                dec!(0.5),
                dec!(0.8),
                dec!(7),
            )
        })
        .collect()
}

/// Twenty stocks with deterministic but uneven attributes.
fn mixed_universe() -> Vec<Stock> {
    (1..=20i64)
        .map(|i| Stock {
            name: format!("M{i:02}"),
            return_1y: Decimal::from(2 + (i * 7) % 13),
            return_5y: Decimal::from(5 + ((i * 5) % 11) * 2),
            return_10y: Decimal::from(8 + ((i * 3) % 17) * 2),
            volatility: dec!(0.3) + Decimal::from(i % 7) * dec!(0.9),
            beta: dec!(0.4) + Decimal::from(i % 9) * dec!(0.12),
            esg: dec!(1) + Decimal::from(i % 8) * dec!(0.9),
        })
        .collect()
}

fn raw(horizon: i64, risk: i64, beta: i64, esg: i64) -> RawChoices {
    RawChoices {
        horizon,
        risk,
        beta,
        esg,
    }
}

fn input(universe: Vec<Stock>, choices: RawChoices) -> PortfolioInput {
    PortfolioInput {
        universe,
        preferences: choices,
        config: None,
    }
}

fn tol() -> Decimal {
    dec!(0.000001)
}

// ===========================================================================
// Documented scenario
// ===========================================================================

#[test]
fn test_gabiln_scenario_binds_risk_esg_and_beta() {
    let out = optimize_portfolio(&input(gabiln_universe(), raw(3, 1, 1, 3))).unwrap();
    let report = &out.result;
    assert_eq!(report.status, SolveStatus::Optimal);

    let close = dec!(0.01);
    let objective = report.objective_value.unwrap();
    assert!(
        (objective - dec!(35.27)).abs() < close,
        "Expected objective 35.27, got {}",
        objective
    );

    let m = report.metrics.as_ref().unwrap();
    assert!((m.volatility - dec!(1.00)).abs() < close, "vol {}", m.volatility);
    assert!((m.esg - dec!(6.00)).abs() < close, "esg {}", m.esg);
    assert!((m.beta - dec!(0.75)).abs() < close, "beta {}", m.beta);
    assert!((m.expected_return - objective).abs() < tol());

    let alloc = report.allocation.as_ref().unwrap();
    assert_eq!(alloc.holdings.len(), 11);
    assert!(alloc.weight_of("BAYNGYEquity").is_none());

    let gabiln = alloc.weight_of("GABILNEquity").unwrap();
    assert!((gabiln - dec!(0.10)).abs() < tol(), "GABILN weight {}", gabiln);
    let top = alloc.holdings[0].weight;
    assert!(
        (top - gabiln).abs() < dec!(0.000000001),
        "GABILN should carry the top weight"
    );

    // The four partial positions are pinned by the binding rows.
    for (name, weight) in [
        ("SIEGYEquity", dec!(0.06)),
        ("ALVGYEquity", dec!(0.07)),
        ("UNANAEquity", dec!(0.08)),
        ("TTEFPEquity", dec!(0.09)),
    ] {
        let w = alloc.weight_of(name).unwrap();
        assert!((w - weight).abs() < dec!(0.0001), "{} weight {}", name, w);
    }
}

#[test]
fn test_ladder_picks_ten_best_at_cap() {
    let out = optimize_portfolio(&input(ladder_universe(), raw(3, 1, 1, 3))).unwrap();
    let report = out.result;
    assert_eq!(report.status, SolveStatus::Optimal);

    // 0.1 * (3 + 4 + ... + 12)
    let objective = report.objective_value.unwrap();
    assert!((objective - dec!(7.5)).abs() < tol(), "objective {}", objective);

    let alloc = report.allocation.unwrap();
    let mut names: Vec<String> = alloc.holdings.iter().map(|h| h.name.clone()).collect();
    names.sort();
    let expected: Vec<String> = (3..=12).map(|i| format!("S{i:02}")).collect();
    assert_eq!(names, expected);
    assert!(out.warnings.iter().any(|w| w.contains("weight cap")));
}

#[test]
fn test_config_cap_override_changes_solution() {
    let mut req = input(ladder_universe(), raw(3, 1, 1, 3));
    req.config = Some(FormulationConfig {
        max_weight: dec!(0.5),
        ..Default::default()
    });
    let report = optimize_portfolio(&req).unwrap().result;
    assert_eq!(report.status, SolveStatus::Optimal);
    // 0.5 * 12 + 0.5 * 11
    let objective = report.objective_value.unwrap();
    assert!((objective - dec!(11.5)).abs() < tol(), "objective {}", objective);
    assert_eq!(report.allocation.unwrap().holdings.len(), 2);
}

// ===========================================================================
// Invariants over every preference combination
// ===========================================================================

#[test]
fn test_optimal_portfolios_respect_all_constraints() {
    let universe = mixed_universe();
    let mut optimal = 0;

    for h in 1..=3 {
        for r in 1..=3 {
            for b in 1..=3 {
                for e in 1..=3 {
                    let prefs = resolve(&raw(h, r, b, e)).unwrap();
                    let t = prefs.targets();
                    let report = optimize_portfolio(&input(universe.clone(), raw(h, r, b, e)))
                        .unwrap()
                        .result;
                    if report.status != SolveStatus::Optimal {
                        assert_eq!(report.status, SolveStatus::Infeasible);
                        assert!(report.allocation.is_none());
                        continue;
                    }
                    optimal += 1;

                    let alloc = report.allocation.unwrap();
                    for holding in &alloc.holdings {
                        assert!(
                            holding.weight <= dec!(0.100000001),
                            "{} over cap: {}",
                            holding.name,
                            holding.weight
                        );
                        assert!(holding.weight > Decimal::ZERO);
                    }

                    let m = report.metrics.unwrap();
                    let ctx = format!("choices ({h},{r},{b},{e})");
                    assert!((m.total_weight - Decimal::ONE).abs() < tol(), "{ctx}: budget");
                    assert!(m.expected_return >= t.min_return() - tol(), "{ctx}: return");
                    assert!(m.volatility <= t.max_volatility() + tol(), "{ctx}: volatility");
                    assert!(m.esg >= t.min_esg() - tol(), "{ctx}: esg");
                    assert!(m.beta >= t.target_beta() - dec!(0.05) - tol(), "{ctx}: beta low");
                    assert!(m.beta <= t.target_beta() + dec!(0.05) + tol(), "{ctx}: beta high");
                    assert!(
                        (m.expected_return - report.objective_value.unwrap()).abs() < tol(),
                        "{ctx}: objective equals realised return"
                    );
                }
            }
        }
    }

    assert!(optimal > 0, "expected at least one feasible combination");
}

#[test]
fn test_medium_risk_neutral_beta_is_feasible() {
    let report = optimize_portfolio(&input(mixed_universe(), raw(3, 2, 2, 1)))
        .unwrap()
        .result;
    assert_eq!(report.status, SolveStatus::Optimal);
}

#[test]
fn test_solving_twice_gives_same_objective() {
    let universe = mixed_universe();
    let prefs = resolve(&raw(3, 2, 2, 1)).unwrap();
    let formulation = build(&universe, &prefs, &FormulationConfig::default()).unwrap();

    let first = solve(&formulation);
    let second = solve(&formulation);
    assert_eq!(first.status, second.status);
    let a = first.objective_value.unwrap();
    let b = second.objective_value.unwrap();
    assert!((a - b).abs() < tol(), "{} vs {}", a, b);
}

// ===========================================================================
// Infeasibility
// ===========================================================================

#[test]
fn test_every_stock_too_volatile_is_infeasible() {
    let universe: Vec<Stock> = ladder_universe()
        .into_iter()
        .map(|mut s| {
            s.volatility = dec!(1.5);
            s
        })
        .collect();
    let out = optimize_portfolio(&input(universe, raw(3, 1, 1, 3))).unwrap();
    assert_eq!(out.result.status, SolveStatus::Infeasible);
    assert!(out.result.allocation.is_none());
    assert!(out.result.metrics.is_none());
    assert!(
        out.warnings.iter().any(|w| w.starts_with("Volatility ceiling")),
        "{:?}",
        out.warnings
    );
}

#[test]
fn test_return_floor_out_of_reach_is_infeasible() {
    // High risk demands 15; the ladder tops out at 7.5
    let out = optimize_portfolio(&input(ladder_universe(), raw(3, 3, 1, 3))).unwrap();
    assert_eq!(out.result.status, SolveStatus::Infeasible);
    assert!(out.warnings.iter().any(|w| w.starts_with("Return floor 15")));
}

#[test]
fn test_fewer_than_ten_stocks_cannot_meet_budget() {
    let universe: Vec<Stock> = ladder_universe().into_iter().take(9).collect();
    let out = optimize_portfolio(&input(universe, raw(3, 1, 1, 3))).unwrap();
    assert_eq!(out.result.status, SolveStatus::Infeasible);
    assert!(out.warnings.iter().any(|w| w.starts_with("Budget unreachable")));
}

// ===========================================================================
// Caller errors
// ===========================================================================

#[test]
fn test_empty_universe_fails_before_solving() {
    let err = optimize_portfolio(&input(vec![], raw(3, 1, 1, 3))).unwrap_err();
    assert!(matches!(err, PortfolioError::EmptyUniverse));

    let mut source = raw(3, 1, 1, 3);
    let err = get_portfolio(&[], None, &mut source).unwrap_err();
    assert!(matches!(err, PortfolioError::EmptyUniverse));
}

#[test]
fn test_choice_four_is_rejected() {
    let err = optimize_portfolio(&input(ladder_universe(), raw(4, 1, 1, 3))).unwrap_err();
    match err {
        PortfolioError::InvalidPreferenceChoice { question, value } => {
            assert_eq!(question, "horizon");
            assert_eq!(value, 4);
        }
        other => panic!("Expected InvalidPreferenceChoice, got {:?}", other),
    }
}

#[test]
fn test_get_portfolio_acquires_missing_preferences() {
    let mut source = raw(3, 1, 1, 3);
    let report = get_portfolio(&ladder_universe(), None, &mut source).unwrap();
    assert_eq!(report.status, SolveStatus::Optimal);
    assert_eq!(report.allocation.unwrap().holdings.len(), 10);
}
