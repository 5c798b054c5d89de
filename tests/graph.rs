use decaymatch::{DecayGraph, Error, Particle};

fn three_chain() -> anyhow::Result<(DecayGraph, [decaymatch::VertexId; 3])> {
    let mut g = DecayGraph::new();
    let a = g.add_vertex(Particle::new(0, 100));
    let b = g.add_vertex(Particle::new(1, 200));
    let c = g.add_vertex(Particle::new(2, 300));
    g.add_edge(a, b)?;
    g.add_edge(b, c)?;
    Ok((g, [a, b, c]))
}

#[test]
fn tracks_vertices_and_edges() -> anyhow::Result<()> {
    let (g, [a, b, c]) = three_chain()?;
    assert_eq!(g.n_vertices(), 3);
    assert_eq!(g.n_edges(), 2);
    assert_eq!(g.out_degree(a)?, 1);
    assert_eq!(g.in_degree(a)?, 0);
    assert_eq!(g.out_neighbors(a)?, &[b]);
    assert_eq!(g.in_neighbors(c)?, &[b]);
    assert_eq!(g.particle(b)?.lund_id, 200);
    assert!(g.has_edge(a, b));
    assert!(!g.has_edge(a, c));
    Ok(())
}

#[test]
fn removal_clears_incident_edges() -> anyhow::Result<()> {
    let (mut g, [a, b, c]) = three_chain()?;
    g.remove_vertex(b)?;
    assert_eq!(g.n_vertices(), 2);
    assert_eq!(g.n_edges(), 0);
    assert_eq!(g.out_degree(a)?, 0);
    assert_eq!(g.in_degree(c)?, 0);
    Ok(())
}

#[test]
fn contraction_rewires_through_the_removed_vertex() -> anyhow::Result<()> {
    let (mut g, [a, b, c]) = three_chain()?;
    g.contract_vertex(b)?;
    assert_eq!(g.n_vertices(), 2);
    assert_eq!(g.n_edges(), 1);
    assert!(g.has_edge(a, c));
    Ok(())
}

#[test]
fn contraction_coalesces_duplicate_edges() -> anyhow::Result<()> {
    let mut g = DecayGraph::new();
    let u = g.add_vertex(Particle::new(0, 1));
    let v = g.add_vertex(Particle::new(1, 2));
    let w = g.add_vertex(Particle::new(2, 3));
    g.add_edge(u, v)?;
    g.add_edge(v, w)?;
    g.add_edge(u, w)?;

    g.contract_vertex(v)?;
    assert!(g.has_edge(u, w));
    assert_eq!(g.n_edges(), 1);
    assert_eq!(g.out_neighbors(u)?, &[w]);
    Ok(())
}

#[test]
fn contraction_without_mothers_is_removal() -> anyhow::Result<()> {
    let (mut g, [a, b, c]) = three_chain()?;
    g.contract_vertex(a)?;
    assert_eq!(g.n_vertices(), 2);
    assert_eq!(g.n_edges(), 1);
    assert_eq!(g.in_degree(b)?, 0);
    assert!(g.has_edge(b, c));
    Ok(())
}

#[test]
fn stale_descriptors_are_detected() -> anyhow::Result<()> {
    let (mut g, [a, b, _c]) = three_chain()?;
    g.remove_vertex(b)?;
    assert!(!g.contains(b));
    assert!(matches!(g.particle(b), Err(Error::GraphInvariant(_))));
    assert!(matches!(g.out_neighbors(b), Err(Error::GraphInvariant(_))));
    assert!(matches!(g.add_edge(a, b), Err(Error::GraphInvariant(_))));
    Ok(())
}

#[test]
fn slot_reuse_does_not_resurrect_old_descriptors() -> anyhow::Result<()> {
    let (mut g, [_a, b, _c]) = three_chain()?;
    g.remove_vertex(b)?;
    let fresh = g.add_vertex(Particle::new(9, 900));
    // the freed slot is reused, but the old generation stays dead
    assert!(g.contains(fresh));
    assert!(!g.contains(b));
    assert!(matches!(g.particle(b), Err(Error::GraphInvariant(_))));
    assert_eq!(g.particle(fresh)?.idx, 9);
    Ok(())
}

#[test]
fn multi_edges_are_permitted() -> anyhow::Result<()> {
    let mut g = DecayGraph::new();
    let u = g.add_vertex(Particle::new(0, 1));
    let v = g.add_vertex(Particle::new(1, 2));
    g.add_edge(u, v)?;
    g.add_edge(u, v)?;
    assert_eq!(g.n_edges(), 2);
    assert_eq!(g.out_degree(u)?, 2);
    Ok(())
}

#[test]
fn iteration_order_is_stable() -> anyhow::Result<()> {
    let (g, _) = three_chain()?;
    let idx: Vec<i32> = g
        .vertices()
        .map(|v| Ok::<_, Error>(g.particle(v)?.idx))
        .collect::<Result<_, _>>()?;
    assert_eq!(idx, [0, 1, 2]);

    let edges: Vec<(i32, i32)> = g
        .edges()
        .map(|(u, v)| Ok::<_, Error>((g.particle(u)?.idx, g.particle(v)?.idx)))
        .collect::<Result<_, _>>()?;
    assert_eq!(edges, [(0, 1), (1, 2)]);
    Ok(())
}

#[test]
fn matched_idx_defaults_unset() -> anyhow::Result<()> {
    let (mut g, [a, ..]) = three_chain()?;
    assert_eq!(g.particle(a)?.matched_idx, -1);
    g.particle_mut(a)?.matched_idx = 5;
    assert_eq!(g.particle(a)?.matched_idx, 5);
    Ok(())
}
