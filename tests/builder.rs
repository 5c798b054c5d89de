use decaymatch::builder::{assemble_reco, build_graph, build_reco, mc_adjacency};
use decaymatch::{BlockRegistry, EdgeAssembler, Error};

#[test]
fn builds_labeled_graph() -> anyhow::Result<()> {
    let (g, vmap) = build_graph(3, &[0, 0], &[1, 2], &[70553, 211, -211])?;
    assert_eq!(g.n_vertices(), 3);
    assert_eq!(g.n_edges(), 2);
    assert_eq!(g.particle(vmap[0])?.idx, 0);
    assert_eq!(g.particle(vmap[0])?.lund_id, 70553);
    assert_eq!(g.out_neighbors(vmap[0])?, &[vmap[1], vmap[2]]);
    Ok(())
}

#[test]
fn rejects_inconsistent_shapes() {
    assert!(matches!(
        build_graph(2, &[0], &[], &[1, 2]),
        Err(Error::Shape(_))
    ));
    assert!(matches!(
        build_graph(2, &[0], &[1], &[1]),
        Err(Error::Shape(_))
    ));
    assert!(matches!(
        build_graph(2, &[0], &[2], &[1, 2]),
        Err(Error::Shape(_))
    ));
    assert!(matches!(
        build_graph(2, &[-1], &[0], &[1, 2]),
        Err(Error::Shape(_))
    ));
}

#[test]
fn unpacks_mc_daughter_ranges() -> anyhow::Result<()> {
    // vertex 0 and 1 are the beams, both mothering the root at 2
    let daulen = [1, 1, 2, 0, 0];
    let dauidx = [2, 2, 3, 0, 0];
    let (from, to) = mc_adjacency(5, &daulen, &dauidx)?;
    assert_eq!(from, [0, 1, 2, 2]);
    assert_eq!(to, [2, 2, 3, 4]);
    Ok(())
}

#[test]
fn non_positive_entries_mean_no_daughters() -> anyhow::Result<()> {
    let (from, to) = mc_adjacency(3, &[0, -1, 1], &[1, 1, 0])?;
    assert!(from.is_empty());
    assert!(to.is_empty());
    Ok(())
}

#[test]
fn mc_adjacency_validates_ranges() {
    assert!(matches!(
        mc_adjacency(3, &[1, 0], &[1, 0]),
        Err(Error::Shape(_))
    ));
    // a daughter range reaching past the vertex count
    assert!(matches!(
        mc_adjacency(3, &[2, 0, 0], &[2, 0, 0]),
        Err(Error::Shape(_))
    ));
}

fn standard_assemblers() -> Vec<EdgeAssembler> {
    BlockRegistry::standard()
        .specs()
        .iter()
        .map(|s| EdgeAssembler::new(s.capacity, s.max_daughters))
        .collect()
}

fn empty_slots(n: usize) -> Vec<Vec<i32>> {
    vec![Vec::new(); n]
}

#[test]
fn assembles_inter_block_edges() -> anyhow::Result<()> {
    let registry = BlockRegistry::standard();
    let mut index = registry.indexer()?;
    let mut assemblers = standard_assemblers();

    // one upsilon decaying to two B mesons
    assemblers[0].associate(
        1,
        &[70553],
        &[2],
        &[vec![521], vec![-521]],
        &[vec![0], vec![1]],
    )?;
    assemblers[1].associate(
        2,
        &[521, -521],
        &[0, 0],
        &empty_slots(4),
        &empty_slots(4),
    )?;
    for (k, spec) in registry.specs().iter().enumerate().skip(2) {
        assemblers[k].associate(
            0,
            &[],
            &[],
            &empty_slots(spec.max_daughters),
            &empty_slots(spec.max_daughters),
        )?;
    }
    index.set_sizes(&[1, 2, 0, 0, 0, 0, 0])?;

    let assembly = assemble_reco(registry, &index, &assemblers)?;
    assert_eq!(assembly.n_vertices, 3);
    assert_eq!(assembly.lund_id, [70553, 521, -521]);
    assert_eq!(assembly.from, [0, 0]);
    assert_eq!(assembly.to, [1, 2]);
    assert_eq!(assembly.block_global_idx[0], [0]);
    assert_eq!(assembly.block_global_idx[1], [1, 2]);
    assert!(assembly.block_global_idx[2].is_empty());

    let (graph, vmap) = build_reco(&assembly)?;
    assert_eq!(graph.n_vertices(), 3);
    assert_eq!(graph.out_degree(vmap[0])?, 2);
    Ok(())
}

#[test]
fn assembly_rejects_size_disagreement() -> anyhow::Result<()> {
    let registry = BlockRegistry::standard();
    let mut index = registry.indexer()?;
    let mut assemblers = standard_assemblers();

    for (k, spec) in registry.specs().iter().enumerate() {
        assemblers[k].associate(
            0,
            &[],
            &[],
            &empty_slots(spec.max_daughters),
            &empty_slots(spec.max_daughters),
        )?;
    }
    // the index says block y has one candidate, the assembler has none
    index.set_sizes(&[1, 0, 0, 0, 0, 0, 0])?;

    assert!(matches!(
        assemble_reco(registry, &index, &assemblers),
        Err(Error::Shape(_))
    ));
    Ok(())
}

#[test]
fn assembly_rejects_unroutable_daughter() -> anyhow::Result<()> {
    let registry = BlockRegistry::standard();
    let mut index = registry.indexer()?;
    let mut assemblers = standard_assemblers();

    // daughter lund id 12345 maps to no block
    assemblers[0].associate(1, &[70553], &[1], &[vec![12345], vec![0]], &[vec![0], vec![0]])?;
    for (k, spec) in registry.specs().iter().enumerate().skip(1) {
        assemblers[k].associate(
            0,
            &[],
            &[],
            &empty_slots(spec.max_daughters),
            &empty_slots(spec.max_daughters),
        )?;
    }
    index.set_sizes(&[1, 0, 0, 0, 0, 0, 0])?;

    assert!(matches!(
        assemble_reco(registry, &index, &assemblers),
        Err(Error::GraphInvariant(_))
    ));
    Ok(())
}
