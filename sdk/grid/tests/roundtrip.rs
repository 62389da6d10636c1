use pixelshare_grid::{
    Grid, GridError, ShareGrid, combine_grids, par_combine_grids, par_split_grid, split_grid,
};
use pixelshare_threshold::ThresholdScheme;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn random_grid(rng: &mut StdRng, width: usize, height: usize, max: u8) -> Grid {
    let samples = (0..width * height).map(|_| rng.gen_range(0..=max)).collect();
    Grid::from_samples(width, height, samples).unwrap()
}

#[test]
fn any_k_of_n_grids_reconstruct() {
    init_logger();
    let mut rng = StdRng::seed_from_u64(1);
    let scheme = ThresholdScheme::new(3, 5, 251).unwrap();
    let secret = random_grid(&mut rng, 17, 11, 250);

    let shares = split_grid(&secret, &scheme, &mut rng).unwrap();
    assert_eq!(shares.len(), 5);

    for a in 0..5 {
        for b in a + 1..5 {
            for c in b + 1..5 {
                let subset = [shares[a].clone(), shares[b].clone(), shares[c].clone()];
                assert_eq!(combine_grids(&subset, &scheme).unwrap(), secret);
            }
        }
    }
}

#[test]
fn default_two_of_three() {
    init_logger();
    let mut rng = StdRng::seed_from_u64(2);
    let scheme = ThresholdScheme::new(2, 3, 251).unwrap();
    let secret = random_grid(&mut rng, 64, 48, 250);

    let shares = par_split_grid(&secret, &scheme).unwrap();

    assert_eq!(par_combine_grids(&shares[..2], &scheme).unwrap(), secret);
    assert_eq!(par_combine_grids(&shares[1..], &scheme).unwrap(), secret);
    assert_eq!(
        combine_grids(&[shares[0].clone(), shares[2].clone()], &scheme).unwrap(),
        secret
    );
}

#[test]
fn share_grids_hide_a_flat_secret() {
    let mut rng = StdRng::seed_from_u64(3);
    let scheme = ThresholdScheme::new(2, 3, 251).unwrap();
    let secret = Grid::from_samples(32, 32, vec![128; 1024]).unwrap();

    let shares = split_grid(&secret, &scheme, &mut rng).unwrap();

    for share in &shares {
        assert_ne!(share.grid, secret);
        let distinct = {
            let mut seen = [false; 256];
            share.grid.samples().iter().for_each(|&v| seen[v as usize] = true);
            seen.iter().filter(|&&s| s).count()
        };
        // fresh coefficients per sample spread the values out
        assert!(distinct > 100, "share {} has {distinct} distinct values", share.index);
    }
}

#[test]
fn seeded_split_is_reproducible() {
    let scheme = ThresholdScheme::new(2, 3, 251).unwrap();
    let secret = random_grid(&mut StdRng::seed_from_u64(4), 8, 8, 250);

    let a = split_grid(&secret, &scheme, &mut StdRng::seed_from_u64(99)).unwrap();
    let b = split_grid(&secret, &scheme, &mut StdRng::seed_from_u64(99)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn raw_samples_need_clamping() {
    let scheme = ThresholdScheme::new(2, 3, 251).unwrap();
    let raw = Grid::from_rows(&[[0u8, 251, 255], [100, 252, 250]]).unwrap();

    assert!(split_grid(&raw, &scheme, &mut StdRng::seed_from_u64(5)).is_err());

    let clamped = raw.clamped(scheme.field().max_element());
    let shares = split_grid(&clamped, &scheme, &mut StdRng::seed_from_u64(5)).unwrap();
    let recovered = combine_grids(&shares[..2], &scheme).unwrap();
    assert_eq!(recovered.samples(), &[0, 250, 250, 100, 250, 250]);
}

#[test]
fn mismatched_grids_are_rejected() {
    let scheme = ThresholdScheme::new(2, 3, 251).unwrap();
    let mut rng = StdRng::seed_from_u64(6);
    let big = split_grid(&Grid::new(4, 4), &scheme, &mut rng).unwrap();
    let small = split_grid(&Grid::new(4, 2), &scheme, &mut rng).unwrap();

    let mixed = [big[0].clone(), small[1].clone()];
    assert_eq!(
        combine_grids(&mixed, &scheme),
        Err(GridError::DimensionMismatch {
            expected: (4, 4),
            found: (4, 2)
        })
    );
}

#[test]
fn tagged_indices_drive_reconstruction() {
    let scheme = ThresholdScheme::new(2, 3, 251).unwrap();
    let mut rng = StdRng::seed_from_u64(7);
    let secret = random_grid(&mut rng, 5, 5, 250);
    let shares = split_grid(&secret, &scheme, &mut rng).unwrap();

    // Mislabelling a share grid yields a different image
    let mislabelled = [
        ShareGrid::new(1, shares[0].grid.clone()),
        ShareGrid::new(3, shares[1].grid.clone()),
    ];
    assert_ne!(combine_grids(&mislabelled, &scheme).unwrap(), secret);
}

#[test]
fn empty_grid_roundtrips() {
    let scheme = ThresholdScheme::new(2, 3, 251).unwrap();
    let empty = Grid::new(0, 0);

    let shares = par_split_grid(&empty, &scheme).unwrap();
    assert_eq!(shares.len(), 3);
    assert_eq!(combine_grids(&shares[..2], &scheme).unwrap(), empty);
}

#[test]
fn stored_shares_reload_and_truncated_ones_are_refused() {
    let scheme = ThresholdScheme::new(2, 3, 251).unwrap();
    let mut rng = StdRng::seed_from_u64(8);
    let secret = random_grid(&mut rng, 4, 3, 250);
    let shares = split_grid(&secret, &scheme, &mut rng).unwrap();

    let stored: Vec<String> = shares.iter().map(|s| toml::to_string(s).unwrap()).collect();
    let loaded: Vec<ShareGrid> = stored.iter().map(|t| toml::from_str(t).unwrap()).collect();
    assert_eq!(combine_grids(&loaded[1..], &scheme).unwrap(), secret);

    // A share file cut short must not load as a 4x3 grid
    let truncated = "index = 1\n\n[grid]\nwidth = 4\nheight = 3\nsamples = [1, 2, 3]\n";
    assert!(toml::from_str::<ShareGrid>(truncated).is_err());
}
