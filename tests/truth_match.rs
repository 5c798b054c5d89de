use decaymatch::{Error, GraphSpec, MatchSeeds, TruthMatcher};

// e+ e- -> Upsilon(4S) -> pi+ pi- on the MC side
const MC_LUND: [i32; 5] = [11, -11, 70553, 211, -211];
const MC_FROM: [i32; 4] = [0, 1, 2, 2];
const MC_TO: [i32; 4] = [2, 2, 3, 4];

fn mc_spec() -> GraphSpec<'static> {
    GraphSpec { n_vertices: 5, from: &MC_FROM, to: &MC_TO, lund_id: &MC_LUND }
}

const RECO_LUND: [i32; 3] = [70553, 211, -211];
const RECO_FROM: [i32; 2] = [0, 0];
const RECO_TO: [i32; 2] = [1, 2];

fn reco_spec() -> GraphSpec<'static> {
    GraphSpec { n_vertices: 3, from: &RECO_FROM, to: &RECO_TO, lund_id: &RECO_LUND }
}

fn seeds(pairs: &[(i32, i32)]) -> MatchSeeds {
    MatchSeeds {
        reco_idx: vec![pairs.iter().map(|&(r, _)| r).collect()],
        matched_idx: vec![pairs.iter().map(|&(_, m)| m).collect()],
    }
}

#[test]
fn matches_a_complete_tree() -> anyhow::Result<()> {
    let matcher = TruthMatcher::compute(mc_spec(), reco_spec(), &seeds(&[(1, 3), (2, 4)]))?;
    assert_eq!(matcher.matching(), &[2, 3, 4]);
    Ok(())
}

#[test]
fn unmatched_daughter_rejects_the_parent() -> anyhow::Result<()> {
    let matcher = TruthMatcher::compute(mc_spec(), reco_spec(), &seeds(&[(1, 3), (2, -1)]))?;
    assert_eq!(matcher.matching(), &[-1, 3, -1]);
    Ok(())
}

#[test]
fn seed_outside_pruned_graph_is_dropped() -> anyhow::Result<()> {
    // B+ -> pi+ gamma: the photon is pruned away, so its seed dies with it
    let mc = GraphSpec {
        n_vertices: 6,
        from: &[0, 1, 2, 3, 3],
        to: &[2, 2, 3, 4, 5],
        lund_id: &[11, -11, 70553, 521, 211, 22],
    };
    let reco = GraphSpec {
        n_vertices: 3,
        from: &[0, 0],
        to: &[1, 2],
        lund_id: &[521, 211, 22],
    };
    let matcher = TruthMatcher::compute(mc, reco, &seeds(&[(1, 4), (2, 5)]))?;
    assert_eq!(matcher.matching(), &[-1, 4, -1]);
    Ok(())
}

#[test]
fn daughter_multiplicity_must_agree() -> anyhow::Result<()> {
    // MC mother has four daughters, the reconstruction only three
    let mc = GraphSpec {
        n_vertices: 7,
        from: &[0, 1, 2, 2, 2, 2],
        to: &[2, 2, 3, 4, 5, 6],
        lund_id: &[11, -11, 70553, 211, -211, 211, -211],
    };
    let reco = GraphSpec {
        n_vertices: 4,
        from: &[0, 0, 0],
        to: &[1, 2, 3],
        lund_id: &[70553, 211, -211, 211],
    };
    let matcher = TruthMatcher::compute(mc, reco, &seeds(&[(1, 3), (2, 4), (3, 5)]))?;
    assert_eq!(matcher.matching(), &[-1, 3, 4, 5]);
    Ok(())
}

#[test]
fn mother_identity_must_agree() -> anyhow::Result<()> {
    // same structure, but the reconstructed composite claims to be a B+
    let reco = GraphSpec {
        n_vertices: 3,
        from: &[0, 0],
        to: &[1, 2],
        lund_id: &[521, 211, -211],
    };
    let matcher = TruthMatcher::compute(mc_spec(), reco, &seeds(&[(1, 3), (2, 4)]))?;
    assert_eq!(matcher.matching(), &[-1, 3, 4]);
    Ok(())
}

#[test]
fn daughters_must_share_a_mother() -> anyhow::Result<()> {
    // two D mesons each owning one pion; a composite built from both fails
    let mc = GraphSpec {
        n_vertices: 7,
        from: &[0, 1, 2, 2, 3, 4],
        to: &[2, 2, 3, 4, 5, 6],
        lund_id: &[11, -11, 70553, 413, -413, 211, -211],
    };
    let reco = GraphSpec {
        n_vertices: 3,
        from: &[0, 0],
        to: &[1, 2],
        lund_id: &[413, 211, -211],
    };
    let matcher = TruthMatcher::compute(mc, reco, &seeds(&[(1, 5), (2, 6)]))?;
    assert_eq!(matcher.matching(), &[-1, 5, 6]);
    Ok(())
}

#[test]
fn matches_nested_composites() -> anyhow::Result<()> {
    // Upsilon -> B+ B-, each B -> pi+ pi-
    let mc = GraphSpec {
        n_vertices: 9,
        from: &[0, 1, 2, 2, 3, 3, 4, 4],
        to: &[2, 2, 3, 4, 5, 6, 7, 8],
        lund_id: &[11, -11, 70553, 521, -521, 211, -211, 211, -211],
    };
    let reco = GraphSpec {
        n_vertices: 7,
        from: &[0, 0, 1, 1, 2, 2],
        to: &[1, 2, 3, 4, 5, 6],
        lund_id: &[70553, 521, -521, 211, -211, 211, -211],
    };
    let seeds = seeds(&[(3, 5), (4, 6), (5, 7), (6, 8)]);
    let matcher = TruthMatcher::compute(mc, reco, &seeds)?;
    assert_eq!(matcher.matching(), &[2, 3, 4, 5, 6, 7, 8]);

    // every match pairs vertices of equal lund id, and matched parents own
    // matched children in the pruned graph
    let reco_graph = matcher.reco_graph();
    let pruned = matcher.pruned_mc();
    let matching = matcher.matching();
    for u in reco_graph.vertices() {
        let p = *reco_graph.particle(u)?;
        let m = matching[p.idx as usize];
        if m < 0 {
            continue;
        }
        let mc_u = pruned.lookup(m).expect("matching points into the pruned graph");
        assert_eq!(pruned.graph().particle(mc_u)?.lund_id, p.lund_id);

        for &v in reco_graph.out_neighbors(u)? {
            let child_match = matching[reco_graph.particle(v)?.idx as usize];
            assert!(child_match >= 0);
            let mc_v = pruned.lookup(child_match).unwrap();
            assert!(pruned.graph().has_edge(mc_u, mc_v));
        }
    }
    Ok(())
}

#[test]
fn composite_without_daughters_is_an_error() {
    let reco = GraphSpec {
        n_vertices: 1,
        from: &[],
        to: &[],
        lund_id: &[70553],
    };
    let result = TruthMatcher::compute(mc_spec(), reco, &MatchSeeds::default());
    assert!(matches!(result, Err(Error::GraphInvariant(_))));
}

#[test]
fn seed_families_must_have_equal_totals() {
    let seeds = MatchSeeds {
        reco_idx: vec![vec![1, 2]],
        matched_idx: vec![vec![3]],
    };
    let result = TruthMatcher::compute(mc_spec(), reco_spec(), &seeds);
    assert!(matches!(result, Err(Error::Shape(_))));
}

#[test]
fn seed_with_out_of_range_reco_index_is_an_error() {
    let result = TruthMatcher::compute(mc_spec(), reco_spec(), &seeds(&[(9, 3)]));
    assert!(matches!(result, Err(Error::Range(_))));
}

#[test]
fn seeds_concatenate_across_families() -> anyhow::Result<()> {
    let seeds = MatchSeeds {
        reco_idx: vec![vec![1], vec![], vec![2]],
        matched_idx: vec![vec![3], vec![], vec![4]],
    };
    let matcher = TruthMatcher::compute(mc_spec(), reco_spec(), &seeds)?;
    assert_eq!(matcher.matching(), &[2, 3, 4]);
    Ok(())
}

#[test]
fn unmatched_final_state_stays_unmatched() -> anyhow::Result<()> {
    let matcher = TruthMatcher::compute(mc_spec(), reco_spec(), &MatchSeeds::default())?;
    assert_eq!(matcher.matching(), &[-1, -1, -1]);
    Ok(())
}
