use lentil::{simulate_dgp, simulate_dgp_with, simulate_outcome_given, Covariates, DgpConfig};
use lentil::{OutcomeFamily, TrueParams};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn arrays_have_length_n() -> anyhow::Result<()> {
    let mut rng = StdRng::seed_from_u64(1);
    for n in [1, 2, 17, 1000] {
        let sim = simulate_dgp(&mut rng, n, 8.0)?;
        assert_eq!(sim.log_area.len(), n);
        assert_eq!(sim.indicator.len(), n);
        assert_eq!(sim.count_covariate.len(), n);
        assert_eq!(sim.outcome.len(), n);
    }
    Ok(())
}

#[test]
fn indicator_is_binary() -> anyhow::Result<()> {
    let mut rng = StdRng::seed_from_u64(2);
    let sim = simulate_dgp(&mut rng, 5000, 8.0)?;
    assert!(sim.indicator.iter().all(|&x| x == 0 || x == 1));
    assert!(sim.indicator.contains(&0));
    assert!(sim.indicator.contains(&1));
    Ok(())
}

#[test]
fn seed_42_is_reproducible() -> anyhow::Result<()> {
    let first = simulate_dgp(&mut StdRng::seed_from_u64(42), 5, 8.0)?;
    let second = simulate_dgp(&mut StdRng::seed_from_u64(42), 5, 8.0)?;

    assert_eq!(first.outcome.len(), 5);
    assert_eq!(first.log_area.len(), 5);
    assert_eq!(first.indicator.len(), 5);
    assert_eq!(first.count_covariate.len(), 5);
    assert_eq!(first.outcome, second.outcome);
    assert_eq!(first, second);

    let other = simulate_dgp(&mut StdRng::seed_from_u64(43), 5, 8.0)?;
    assert_ne!(first, other);
    Ok(())
}

#[test]
fn bit_identical_floats() -> anyhow::Result<()> {
    let a = simulate_dgp(&mut StdRng::seed_from_u64(9), 100, 3.5)?;
    let b = simulate_dgp(&mut StdRng::seed_from_u64(9), 100, 3.5)?;
    assert_eq!(a.intercept.to_bits(), b.intercept.to_bits());
    for (x, y) in a.log_area.iter().zip(b.log_area.iter()) {
        assert_eq!(x.to_bits(), y.to_bits());
    }
    Ok(())
}

#[test]
fn singleton_and_empty() -> anyhow::Result<()> {
    let mut rng = StdRng::seed_from_u64(5);
    let sim = simulate_dgp(&mut rng, 1, 8.0)?;
    assert_eq!(sim.outcome.len(), 1);
    assert!(simulate_dgp(&mut rng, 0, 8.0).is_err());
    Ok(())
}

#[test]
fn non_positive_count_rate_is_rejected() {
    let mut rng = StdRng::seed_from_u64(5);
    assert!(simulate_dgp(&mut rng, 10, 0.0).is_err());
    assert!(simulate_dgp(&mut rng, 10, -8.0).is_err());
    assert!(simulate_dgp(&mut rng, 10, f64::NAN).is_err());
}

#[test]
fn invalid_arguments_consume_no_entropy() -> anyhow::Result<()> {
    let mut rng = StdRng::seed_from_u64(77);
    assert!(simulate_dgp(&mut rng, 0, 8.0).is_err());
    assert!(simulate_dgp(&mut rng, 10, -1.0).is_err());
    let after_errors = simulate_dgp(&mut rng, 10, 8.0)?;
    let fresh = simulate_dgp(&mut StdRng::seed_from_u64(77), 10, 8.0)?;
    assert_eq!(after_errors, fresh);
    Ok(())
}

#[test]
fn outcome_mean_matches_rate() -> anyhow::Result<()> {
    let mut rng = StdRng::seed_from_u64(2024);
    let sim = simulate_dgp(&mut rng, 100_000, 8.0)?;
    let ratio = sim.mean_rate_ratio();
    assert!((ratio - 1.0).abs() < 0.05, "mean outcome/rate = {}", ratio);
    assert!(sim.rates().iter().all(|&r| r > 0.0 && r.is_finite()));
    Ok(())
}

#[test]
fn parameters_near_prior_means() -> anyhow::Result<()> {
    // averaged over many runs the drawn parameters follow their priors
    let mut rng = StdRng::seed_from_u64(8);
    let runs = 2000;
    let mut sum = [0.0; 3];
    for _ in 0..runs {
        let p = simulate_dgp(&mut rng, 1, 8.0)?.params();
        for (s, v) in sum.iter_mut().zip(p.values()) {
            *s += v;
        }
    }
    let mean: Vec<f64> = sum.iter().map(|s| s / runs as f64).collect();
    assert!((mean[0] - 4_f64.ln()).abs() < 0.01);
    assert!((mean[1] + 0.25).abs() < 0.01);
    assert!((mean[2] + 0.5).abs() < 0.1);
    Ok(())
}

#[test]
fn fixed_covariates_are_kept() -> anyhow::Result<()> {
    let cov = Covariates::new(vec![1.5, 1.4, 1.6], vec![0, 1, 1], vec![8, 0, 12])?;
    let config = DgpConfig::default();
    let mut rng = StdRng::seed_from_u64(3);
    let sim = simulate_outcome_given(&mut rng, &cov, &config)?;
    assert_eq!(sim.log_area, cov.log_area());
    assert_eq!(sim.indicator, cov.indicator());
    assert_eq!(sim.count_covariate, cov.count_covariate());
    assert_eq!(sim.outcome.len(), 3);

    let again = simulate_outcome_given(&mut StdRng::seed_from_u64(3), &cov, &config)?;
    assert_eq!(sim, again);
    Ok(())
}

#[test]
fn fixed_params_and_covariates() -> anyhow::Result<()> {
    let n = 20_000;
    let cov = Covariates::new(vec![0.0; n], vec![0; n], vec![0; n])?;
    let params = TrueParams {
        intercept: 2_f64.ln(),
        slope: 0.0,
        indicator_slope: 0.0,
    };
    let mut rng = StdRng::seed_from_u64(4);
    let y = lentil::draw_outcomes(&mut rng, &params, &cov, &OutcomeFamily::Poisson)?;
    let mean = y.iter().map(|&v| v as f64).sum::<f64>() / n as f64;
    approx::assert_abs_diff_eq!(mean, 2.0, epsilon = 0.05);
    Ok(())
}

#[test]
fn negative_binomial_dataset_is_overdispersed() -> anyhow::Result<()> {
    let n = 20_000;
    let cov = Covariates::new(vec![1.5; n], vec![0; n], vec![4; n])?;
    let params = TrueParams {
        intercept: 4_f64.ln(),
        slope: -0.25,
        indicator_slope: -0.5,
    };
    let mut rng = StdRng::seed_from_u64(6);

    let pois = lentil::draw_outcomes(&mut rng, &params, &cov, &OutcomeFamily::Poisson)?;
    let nb = lentil::draw_outcomes(
        &mut rng,
        &params,
        &cov,
        &OutcomeFamily::NegativeBinomial { phi: 1.0 },
    )?;

    let moments = |y: &[u64]| {
        let m = y.iter().map(|&v| v as f64).sum::<f64>() / y.len() as f64;
        let v = y.iter().map(|&x| (x as f64 - m).powi(2)).sum::<f64>() / (y.len() - 1) as f64;
        (m, v)
    };
    let (pm, pv) = moments(&pois);
    let (nm, nv) = moments(&nb);

    // rate = 4 * e^1.5 * e^-1, about 6.6
    assert!((pv / pm - 1.0).abs() < 0.1);
    assert!((nm - pm).abs() < 0.3);
    assert!(nv / nm > 4.0);
    Ok(())
}

#[test]
fn config_count_rate_reaches_covariates() -> anyhow::Result<()> {
    let config = DgpConfig::with_count_rate(2.0);
    let mut rng = StdRng::seed_from_u64(12);
    let sim = simulate_dgp_with(&mut rng, 20_000, &config)?;
    let mean = sim.count_covariate.iter().map(|&c| c as f64).sum::<f64>() / 20_000.0;
    assert!((mean - 2.0).abs() < 0.05);

    let same = simulate_dgp(&mut StdRng::seed_from_u64(12), 20_000, 2.0)?;
    assert_eq!(sim, same);
    Ok(())
}
