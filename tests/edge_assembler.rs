use decaymatch::{EdgeAssembler, Error};

#[test]
fn associates_slot_major_arrays() -> anyhow::Result<()> {
    let mut assembler = EdgeAssembler::new(10, 2);

    // two mothers; slot j holds the j-th daughter of every mother
    assembler.associate(
        2,
        &[70553, 521],
        &[2, 1],
        &[vec![521, 211], vec![-521, 0]],
        &[vec![0, 3], vec![1, 0]],
    )?;

    assert_eq!(assembler.n_mothers(), 2);
    assert_eq!(assembler.n_daughters(0), 2);
    assert_eq!(assembler.n_daughters(1), 1);

    assert_eq!(assembler.mother_lund(0), 70553);
    assert_eq!(assembler.daughter_lund(0, 0), 521);
    assert_eq!(assembler.daughter_idx(0, 0), 0);
    assert_eq!(assembler.daughter_lund(0, 1), -521);
    assert_eq!(assembler.daughter_idx(0, 1), 1);
    assert_eq!(assembler.daughter_info(1, 0), (211, 3));
    Ok(())
}

#[test]
fn zero_slot_block_accepts_empty_slot_lists() -> anyhow::Result<()> {
    let mut assembler = EdgeAssembler::new(5, 0);
    assembler.associate(2, &[22, 22], &[0, 0], &[], &[])?;
    assert_eq!(assembler.n_mothers(), 2);
    assert_eq!(assembler.n_daughters(0), 0);
    Ok(())
}

#[test]
fn rebuilds_between_events() -> anyhow::Result<()> {
    let mut assembler = EdgeAssembler::new(10, 1);
    assembler.associate(2, &[1, 2], &[1, 1], &[vec![3, 4]], &[vec![0, 1]])?;
    assembler.associate(1, &[9], &[0], &[vec![0]], &[vec![0]])?;
    assert_eq!(assembler.n_mothers(), 1);
    assert_eq!(assembler.n_daughters(0), 0);
    Ok(())
}

#[test]
fn rejects_capacity_overflow() {
    let mut assembler = EdgeAssembler::new(1, 1);
    let result = assembler.associate(2, &[1, 2], &[0, 0], &[vec![0, 0]], &[vec![0, 0]]);
    assert!(matches!(result, Err(Error::Range(_))));
}

#[test]
fn validates_mother_major_lengths() {
    // mother_lund and ndaus are checked against n_mothers...
    let mut assembler = EdgeAssembler::new(10, 1);
    assert!(matches!(
        assembler.associate(2, &[1], &[0, 0], &[vec![0, 0]], &[vec![0, 0]]),
        Err(Error::Shape(_))
    ));
    assert!(matches!(
        assembler.associate(2, &[1, 2], &[0], &[vec![0, 0]], &[vec![0, 0]]),
        Err(Error::Shape(_))
    ));
}

#[test]
fn validates_slot_major_lengths() {
    // ...while the slot lists are checked against max_daughters
    let mut assembler = EdgeAssembler::new(10, 2);
    assert!(matches!(
        assembler.associate(1, &[1], &[0], &[vec![0]], &[vec![0]]),
        Err(Error::Shape(_))
    ));
    assert!(matches!(
        assembler.associate(
            1,
            &[1],
            &[0],
            &[vec![0], vec![0], vec![0]],
            &[vec![0], vec![0], vec![0]]
        ),
        Err(Error::Shape(_))
    ));
}

#[test]
fn rejects_short_slot_arrays() {
    let mut assembler = EdgeAssembler::new(10, 1);
    let result = assembler.associate(3, &[1, 2, 3], &[0, 0, 1], &[vec![7]], &[vec![0]]);
    assert!(matches!(result, Err(Error::Shape(_))));
}

#[test]
fn rejects_daughter_count_beyond_slots() {
    let mut assembler = EdgeAssembler::new(10, 1);
    let result = assembler.associate(1, &[1], &[2], &[vec![7]], &[vec![0]]);
    assert!(matches!(result, Err(Error::Range(_))));
}

#[test]
fn rejects_negative_daughter_index() {
    let mut assembler = EdgeAssembler::new(10, 1);
    let result = assembler.associate(1, &[1], &[1], &[vec![7]], &[vec![-1]]);
    assert!(matches!(result, Err(Error::Range(_))));
}
