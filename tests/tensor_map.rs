mod common;

use common::{array, full, test_tensor_map};
use tensormap::prelude::*;

#[test]
fn keys() -> anyhow::Result<()> {
    let tensor = test_tensor_map()?;
    let expected = Labels::new(&["key_1", "key_2"], [[0, 0], [1, 0], [2, 2], [2, 3]])?;
    assert_eq!(tensor.keys(), &expected);
    assert_eq!(tensor.len(), 4);
    assert_eq!(tensor.sample_names(), vec!["samples"]);
    assert_eq!(tensor.components_names(), vec!["component"]);
    assert_eq!(tensor.property_names(), vec!["properties"]);
    Ok(())
}

#[test]
fn get_blocks() -> anyhow::Result<()> {
    let tensor = test_tensor_map()?;

    let block = tensor.block_by_id(2)?;
    assert_eq!(block.values().data()[[0, 0, 0]], 3.0);
    assert!(matches!(tensor.block_by_id(4), Err(Error::NotFound(_))));

    let selection = Labels::new(&["key_1", "key_2"], [[1, 0]])?;
    assert_eq!(tensor.blocks_matching(&selection)?, vec![1]);

    let selection = Labels::new(&["key_2"], [[0]])?;
    assert_eq!(tensor.blocks_matching(&selection)?, vec![0, 1]);

    let selection = Labels::new(&["key_2"], [[7]])?;
    assert!(tensor.blocks_matching(&selection)?.is_empty());

    let selection = Labels::new(&["key_3"], [[0]])?;
    assert!(matches!(
        tensor.blocks_matching(&selection),
        Err(Error::NotFound(_))
    ));

    let selection = Labels::new(&["key_2"], [[0], [2]])?;
    assert!(matches!(
        tensor.blocks_matching(&selection),
        Err(Error::DimensionMismatch(_))
    ));
    Ok(())
}

#[test]
fn block_selection() -> anyhow::Result<()> {
    let tensor = test_tensor_map()?;

    // all selection flavors reach the same block
    let by_index = tensor.block(Selection::Index(3))?;
    let labels = Labels::new(&["key_1", "key_2"], [[2, 3]])?;
    let by_labels = tensor.block(&labels)?;
    let by_entry = tensor.block(tensor.keys().entry(3).expect("missing key"))?;
    let by_map = tensor.block(sel!["key_2" => 3])?;
    let by_pairs = tensor.block([("key_1", 2i64), ("key_2", 3i64)])?;
    for block in [by_labels, by_entry, by_map, by_pairs] {
        assert_eq!(block.samples(), by_index.samples());
        assert_eq!(block.values(), by_index.values());
    }

    assert!(matches!(
        tensor.block(sel!["key_1" => 2]),
        Err(Error::Ambiguous(_))
    ));
    assert!(matches!(
        tensor.block(sel!["key_1" => 5]),
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        tensor.block(sel!["key_1" => 1i64 << 40]),
        Err(Error::TypeMismatch(_))
    ));
    assert!(matches!(
        tensor.block(sel!["other" => 0]),
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        tensor.block(Selection::Index(10)),
        Err(Error::NotFound(_))
    ));
    Ok(())
}

#[test]
fn blocks_selection() -> anyhow::Result<()> {
    let tensor = test_tensor_map()?;
    assert_eq!(tensor.blocks(None)?.len(), 4);
    assert_eq!(tensor.blocks(sel!["key_1" => 2])?.len(), 2);
    assert!(tensor.blocks(sel!["key_1" => 5])?.is_empty());

    let values: Vec<f64> = tensor
        .blocks(sel!["key_2" => 0])?
        .iter()
        .map(|block| block.values().data()[[0, 0, 0]])
        .collect();
    assert_eq!(values, vec![1.0, 2.0]);

    let keys: Vec<String> = tensor.iter().map(|(key, _)| key.print()).collect();
    assert_eq!(keys[2], "(key_1=2, key_2=2)");
    Ok(())
}

#[test]
fn construction_errors() -> anyhow::Result<()> {
    let block = || -> anyhow::Result<Block<NdArray<f64>>> {
        Ok(Block::new(
            full(&[1, 1], 0.0),
            Labels::new(&["s"], [[0]])?,
            vec![],
            Labels::new(&["p"], [[0]])?,
        )?)
    };

    let keys = Labels::new(&["k"], [[0], [1]])?;
    let err = TensorMap::new(keys.clone(), vec![block()?]).unwrap_err();
    assert!(matches!(err, Error::DimensionMismatch(_)));

    // blocks with different sample names
    let other = Block::new(
        full(&[1, 1], 0.0),
        Labels::new(&["t"], [[0]])?,
        vec![],
        Labels::new(&["p"], [[0]])?,
    )?;
    let err = TensorMap::new(keys.clone(), vec![block()?, other]).unwrap_err();
    assert!(matches!(err, Error::DimensionMismatch(_)));

    // blocks with different gradients
    let mut other = block()?;
    let gradient = Block::new(
        full(&[1, 1], 0.0),
        Labels::new(&["sample"], [[0]])?,
        vec![],
        Labels::new(&["p"], [[0]])?,
    )?;
    other.add_gradient("g", gradient)?;
    let err = TensorMap::new(keys.clone(), vec![block()?, other]).unwrap_err();
    assert!(matches!(err, Error::DimensionMismatch(_)));

    let tensor = TensorMap::new(keys, vec![block()?, block()?])?;
    assert!(tensor.block_by_id(1)?.ownership().is_owned());
    Ok(())
}

#[test]
fn blocks_from_another_map() -> anyhow::Result<()> {
    let tensor = test_tensor_map()?;
    let blocks: Vec<_> = tensor.blocks_by_id(&[0, 1])?.into_iter().cloned().collect();
    let keys = Labels::new(&["key_1", "key_2"], [[0, 0], [1, 0]])?;

    let err = TensorMap::new(keys.clone(), blocks).unwrap_err();
    assert!(matches!(err, Error::OwnershipViolation(_)));

    // the original tensor map is still usable
    assert_eq!(tensor.len(), 4);
    assert_eq!(tensor.block_by_id(1)?.values().data()[[2, 0, 2]], 2.0);
    let moved = tensor.keys_to_samples("key_2", true)?;
    assert_eq!(moved.len(), 3);

    // copies are fine, and so are the blocks released with into_raw
    let copies = tensor.blocks_by_id(&[0, 1])?.into_iter().map(Block::copy).collect();
    assert_eq!(TensorMap::new(keys, copies)?.len(), 2);

    let (keys, blocks) = tensor.into_raw();
    assert!(blocks.iter().all(|b| !b.ownership().is_owned()));
    assert_eq!(TensorMap::new(keys, blocks)?.len(), 4);
    Ok(())
}

#[test]
fn keys_to_samples() -> anyhow::Result<()> {
    let tensor = test_tensor_map()?.keys_to_samples("key_2", true)?;
    assert_eq!(tensor.keys(), &Labels::new(&["key_1"], [[0], [1], [2]])?);

    // the first two blocks are not modified
    let block = tensor.block_by_id(0)?;
    assert_eq!(
        block.samples(),
        &Labels::new(&["samples", "key_2"], [[0, 0], [2, 0], [4, 0]])?
    );
    assert_eq!(block.values(), &full(&[3, 1, 1], 1.0));

    let block = tensor.block_by_id(1)?;
    assert_eq!(
        block.samples(),
        &Labels::new(&["samples", "key_2"], [[0, 0], [1, 0], [3, 0]])?
    );
    assert_eq!(block.values(), &full(&[3, 1, 3], 2.0));

    // the third block contains the old third and fourth blocks merged
    let block = tensor.block_by_id(2)?;
    assert_eq!(
        block.samples(),
        &Labels::new(
            &["samples", "key_2"],
            [[0, 2], [0, 3], [1, 3], [2, 3], [3, 2], [5, 3], [6, 2], [8, 2]]
        )?
    );
    let rows = [3.0, 4.0, 4.0, 4.0, 3.0, 4.0, 3.0, 3.0];
    let expected = array(&[8, 3, 1], rows.iter().flat_map(|&v| [v; 3]).collect())?;
    assert_eq!(block.values().data(), &expected);

    let gradient = block.gradient("parameter").expect("missing gradient");
    assert_eq!(
        gradient.samples(),
        &Labels::new(&["sample", "parameter"], [[1, 1], [4, -2], [5, 3]])?
    );
    let expected = array(&[3, 3, 1], [14.0, 14.0, 14.0, 13.0, 13.0, 13.0, 14.0, 14.0, 14.0].to_vec())?;
    assert_eq!(gradient.values().data(), &expected);

    // unsorted samples
    let tensor = test_tensor_map()?.keys_to_samples("key_2", false)?;
    let block = tensor.block_by_id(2)?;
    assert_eq!(
        block.samples(),
        &Labels::new(
            &["samples", "key_2"],
            [[0, 2], [3, 2], [6, 2], [8, 2], [0, 3], [1, 3], [2, 3], [5, 3]]
        )?
    );
    let gradient = block.gradient("parameter").expect("missing gradient");
    assert_eq!(
        gradient.samples(),
        &Labels::new(&["sample", "parameter"], [[1, -2], [4, 1], [7, 3]])?
    );
    Ok(())
}

#[test]
fn keys_to_samples_recovers_keys() -> anyhow::Result<()> {
    let original = test_tensor_map()?;
    let tensor = original.keys_to_samples("key_2", true)?;

    for (key, block) in tensor.iter() {
        let key_1 = key.get("key_1").expect("missing key_1");
        let key_2 = block.samples().column("key_2")?;
        let samples = block.samples().column("samples")?;
        for (sample, key_2) in samples.iter().zip(key_2) {
            let original_block = original.block(sel!["key_1" => key_1.into(), "key_2" => key_2.into()])?;
            assert!(original_block.samples().contains([*sample]));
        }
    }
    Ok(())
}

#[test]
fn keys_to_samples_errors() -> anyhow::Result<()> {
    let tensor = test_tensor_map()?;
    // blocks 0 and 1 have different properties
    assert!(matches!(
        tensor.keys_to_samples("key_1", true),
        Err(Error::DimensionMismatch(_))
    ));
    assert!(matches!(
        tensor.keys_to_samples("key_3", true),
        Err(Error::NotFound(_))
    ));
    let labels = Labels::new(&["key_2"], [[0]])?;
    assert!(matches!(
        tensor.keys_to_samples(&labels, true),
        Err(Error::DimensionMismatch(_))
    ));
    Ok(())
}

#[test]
fn keys_to_samples_all_dimensions() -> anyhow::Result<()> {
    let component = Labels::new(&["c"], [[0]])?;
    let block = |value: f64, samples: [[i32; 1]; 2]| -> anyhow::Result<Block<NdArray<f64>>> {
        Ok(Block::new(
            full(&[2, 1, 1], value),
            Labels::new(&["s"], samples)?,
            vec![component.clone()],
            Labels::new(&["p"], [[0]])?,
        )?)
    };
    let tensor = TensorMap::new(
        Labels::new(&["a", "b"], [[1, 0], [0, 0]])?,
        vec![block(1.0, [[0], [1]])?, block(2.0, [[0], [2]])?],
    )?;

    let merged = tensor.keys_to_samples(["a", "b"], true)?;
    assert_eq!(merged.keys(), &Labels::single());
    let block = merged.block_by_id(0)?;
    assert_eq!(
        block.samples(),
        &Labels::new(&["s", "a", "b"], [[0, 0, 0], [0, 1, 0], [1, 1, 0], [2, 0, 0]])?
    );
    assert_eq!(
        block.values().data(),
        &array(&[4, 1, 1], vec![2.0, 1.0, 1.0, 2.0])?
    );
    Ok(())
}

#[test]
fn keys_to_properties() -> anyhow::Result<()> {
    let tensor = test_tensor_map()?.keys_to_properties("key_1", true)?;
    assert_eq!(tensor.keys(), &Labels::new(&["key_2"], [[0], [2], [3]])?);

    // the first block contains the old first two blocks merged
    let block = tensor.block_by_id(0)?;
    assert_eq!(block.samples(), &Labels::range("samples", 5)?);
    assert_eq!(block.components(), &[Labels::new(&["component"], [[0]])?]);
    assert_eq!(
        block.properties(),
        &Labels::new(&["key_1", "properties"], [[0, 0], [1, 3], [1, 4], [1, 5]])?
    );
    let expected = array(
        &[5, 1, 4],
        vec![
            1.0, 2.0, 2.0, 2.0, //
            0.0, 2.0, 2.0, 2.0, //
            1.0, 0.0, 0.0, 0.0, //
            0.0, 2.0, 2.0, 2.0, //
            1.0, 0.0, 0.0, 0.0,
        ],
    )?;
    assert_eq!(block.values().data(), &expected);

    let gradient = block.gradient("parameter").expect("missing gradient");
    assert_eq!(
        gradient.samples(),
        &Labels::new(&["sample", "parameter"], [[0, -2], [0, 3], [3, -2], [4, 3]])?
    );
    let expected = array(
        &[4, 1, 4],
        vec![
            11.0, 12.0, 12.0, 12.0, //
            0.0, 12.0, 12.0, 12.0, //
            0.0, 12.0, 12.0, 12.0, //
            11.0, 0.0, 0.0, 0.0,
        ],
    )?;
    assert_eq!(gradient.values().data(), &expected);

    // the other blocks are the old third and fourth blocks
    let block = tensor.block_by_id(1)?;
    assert_eq!(
        block.properties(),
        &Labels::new(&["key_1", "properties"], [[2, 0]])?
    );
    assert_eq!(block.values(), &full(&[4, 3, 1], 3.0));

    let block = tensor.block_by_id(2)?;
    assert_eq!(
        block.properties(),
        &Labels::new(&["key_1", "properties"], [[2, 0]])?
    );
    assert_eq!(block.values(), &full(&[4, 3, 1], 4.0));
    Ok(())
}

#[test]
fn keys_to_properties_unsorted() -> anyhow::Result<()> {
    let tensor = test_tensor_map()?.keys_to_properties("key_1", false)?;
    let block = tensor.block_by_id(0)?;
    assert_eq!(
        block.samples(),
        &Labels::new(&["samples"], [[0], [2], [4], [1], [3]])?
    );
    let gradient = block.gradient("parameter").expect("missing gradient");
    assert_eq!(
        gradient.samples(),
        &Labels::new(&["sample", "parameter"], [[0, -2], [2, 3], [0, 3], [4, -2]])?
    );
    Ok(())
}

fn same_properties_tensor() -> anyhow::Result<common::Tensor> {
    let block = |value: f64, samples: &[[i32; 1]]| -> anyhow::Result<Block<NdArray<f64>>> {
        let mut block = Block::new(
            full(&[samples.len(), 2], value),
            Labels::new(&["s"], samples)?,
            vec![],
            Labels::new(&["p"], [[0], [1]])?,
        )?;
        let gradient = Block::new(
            full(&[1, 2], value * 10.0),
            Labels::new(&["sample"], [[0]])?,
            vec![],
            Labels::new(&["p"], [[0], [1]])?,
        )?;
        block.add_gradient("g", gradient)?;
        Ok(block)
    };
    Ok(TensorMap::new(
        Labels::new(&["k", "m"], [[0, 0], [2, 0], [0, 1]])?,
        vec![
            block(1.0, &[[0], [1]])?,
            block(2.0, &[[1]])?,
            block(3.0, &[[5]])?,
        ],
    )?)
}

#[test]
fn keys_to_properties_explicit_keys() -> anyhow::Result<()> {
    let tensor = same_properties_tensor()?;
    let keys_to_move = Labels::new(&["k"], [[0], [1], [2]])?;
    let moved = tensor.keys_to_properties(&keys_to_move, true)?;
    assert_eq!(moved.keys(), &Labels::new(&["m"], [[0], [1]])?);

    let block = moved.block_by_id(0)?;
    assert_eq!(block.samples(), &Labels::new(&["s"], [[0], [1]])?);
    // one property per row of keys_to_move and per original property
    assert_eq!(block.properties().count(), keys_to_move.count() * 2);
    assert_eq!(
        block.properties(),
        &Labels::new(&["k", "p"], [[0, 0], [0, 1], [1, 0], [1, 1], [2, 0], [2, 1]])?
    );
    let expected = array(
        &[2, 6],
        vec![
            1.0, 1.0, 0.0, 0.0, 0.0, 0.0, //
            1.0, 1.0, 0.0, 0.0, 2.0, 2.0,
        ],
    )?;
    assert_eq!(block.values().data(), &expected);

    let gradient = block.gradient("g").expect("missing gradient");
    assert_eq!(gradient.samples(), &Labels::new(&["sample"], [[0], [1]])?);
    let expected = array(
        &[2, 6],
        vec![
            10.0, 10.0, 0.0, 0.0, 0.0, 0.0, //
            0.0, 0.0, 0.0, 0.0, 20.0, 20.0,
        ],
    )?;
    assert_eq!(gradient.values().data(), &expected);

    // the block with m=1 only has values for k=0
    let block = moved.block_by_id(1)?;
    let expected = array(&[1, 6], vec![3.0, 3.0, 0.0, 0.0, 0.0, 0.0])?;
    assert_eq!(block.values().data(), &expected);
    Ok(())
}

#[test]
fn keys_to_properties_explicit_errors() -> anyhow::Result<()> {
    let tensor = same_properties_tensor()?;
    // k=2 is missing
    let keys_to_move = Labels::new(&["k"], [[0], [1]])?;
    assert!(matches!(
        tensor.keys_to_properties(&keys_to_move, true),
        Err(Error::NotFound(_))
    ));

    // blocks 0 and 1 of the test tensor map have different properties
    let tensor = test_tensor_map()?;
    let keys_to_move = Labels::new(&["key_1"], [[0], [1]])?;
    assert!(matches!(
        tensor.keys_to_properties(&keys_to_move, true),
        Err(Error::DimensionMismatch(_))
    ));

    // an empty labels only gives names
    let keys_to_move = Labels::empty(&["key_1"])?;
    let moved = tensor.keys_to_properties(&keys_to_move, true)?;
    assert_eq!(moved.block_by_id(0)?.properties().count(), 4);
    Ok(())
}

#[test]
fn components_to_properties() -> anyhow::Result<()> {
    let tensor = test_tensor_map()?.components_to_properties(&["component"])?;

    let block = tensor.block_by_id(0)?;
    assert_eq!(block.samples(), &Labels::new(&["samples"], [[0], [2], [4]])?);
    assert!(block.components().is_empty());
    assert_eq!(
        block.properties(),
        &Labels::new(&["component", "properties"], [[0, 0]])?
    );

    let block = tensor.block_by_id(2)?;
    assert_eq!(block.values(), &full(&[4, 3], 3.0));
    assert_eq!(
        block.properties(),
        &Labels::new(&["component", "properties"], [[0, 0], [1, 0], [2, 0]])?
    );
    let gradient = block.gradient("parameter").expect("missing gradient");
    assert!(gradient.components().is_empty());
    assert_eq!(gradient.values(), &full(&[1, 3], 13.0));

    assert!(matches!(
        test_tensor_map()?.components_to_properties(&["missing"]),
        Err(Error::NotFound(_))
    ));
    Ok(())
}

#[test]
fn components_to_properties_order() -> anyhow::Result<()> {
    let values = array(&[1, 2, 3, 2], (0..12).map(f64::from).collect())?;
    let mut block = Block::new(
        NdArray::from(values),
        Labels::new(&["s"], [[0]])?,
        vec![
            Labels::new(&["a"], [[0], [1]])?,
            Labels::new(&["b"], [[0], [1], [2]])?,
        ],
        Labels::new(&["p"], [[0], [1]])?,
    )?;
    let mut gradient_components = vec![Labels::new(&["xyz"], [[0], [1], [2]])?];
    gradient_components.extend(block.components().iter().cloned());
    let gradient = Block::new(
        full(&[1, 3, 2, 3, 2], 1.0),
        Labels::new(&["sample"], [[0]])?,
        gradient_components,
        block.properties().clone(),
    )?;
    block.add_gradient("positions", gradient)?;
    let tensor = TensorMap::new(Labels::single(), vec![block])?;

    let moved = tensor.components_to_properties(&["a"])?;
    let block = moved.block_by_id(0)?;
    assert_eq!(block.components(), &[Labels::new(&["b"], [[0], [1], [2]])?]);
    assert_eq!(
        block.properties(),
        &Labels::new(&["a", "p"], [[0, 0], [0, 1], [1, 0], [1, 1]])?
    );
    let expected = array(
        &[1, 3, 4],
        vec![0.0, 1.0, 6.0, 7.0, 2.0, 3.0, 8.0, 9.0, 4.0, 5.0, 10.0, 11.0],
    )?;
    assert_eq!(block.values().data(), &expected);

    let gradient = block.gradient("positions").expect("missing gradient");
    let names: Vec<&str> = gradient
        .components()
        .iter()
        .map(|c| c.names()[0].as_str())
        .collect();
    assert_eq!(names, vec!["xyz", "b"]);
    assert_eq!(gradient.values().shape(), &[1, 3, 3, 4]);

    // moving in another order changes the property order
    let moved = tensor.components_to_properties(&["b", "a"])?;
    let block = moved.block_by_id(0)?;
    assert_eq!(block.properties().names(), ["b", "a", "p"]);
    assert_eq!(block.properties().row(1), &[0, 0, 1]);
    assert_eq!(block.properties().row(2), &[0, 1, 0]);
    assert_eq!(block.values().data()[[0, 2]], 6.0);
    Ok(())
}

#[test]
fn components_to_properties_identity() -> anyhow::Result<()> {
    let tensor = test_tensor_map()?;
    let same = tensor.components_to_properties(&[])?;
    for ((_, block), (_, original)) in same.iter().zip(tensor.iter()) {
        assert_eq!(block.values(), original.values());
        assert_eq!(block.samples(), original.samples());
        assert_eq!(block.components(), original.components());
        assert_eq!(block.properties(), original.properties());
    }
    Ok(())
}

#[test]
fn print() -> anyhow::Result<()> {
    let tensor = test_tensor_map()?;
    let expected = "TensorMap with 4 blocks\nkeys: key_1  key_2\n        0      0\n        1      0\n        2      2\n        2      3";
    assert_eq!(tensor.print(-1), expected);
    assert_eq!(tensor.to_string(), expected);

    let truncated = "TensorMap with 4 blocks\nkeys: key_1  key_2\n        0      0\n          ...\n        2      3";
    assert_eq!(tensor.print(2), truncated);
    Ok(())
}
