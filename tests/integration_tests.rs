//! Integration tests for the tkcombine library
//!
//! These tests drive the combiner end to end: parameter tables in legacy
//! notation, precomputed tree values, flat feature sets and Gram matrices.

use approx::assert_relative_eq;
use tkcombine::{
    BasicKernel, BlendConfig, Document, DocumentKernel, GramMatrix, KernelCache, KernelCombiner,
    KernelError, KernelFamily, KernelSettings, ParameterTable, PrecomputedTreeKernel, SparseVector,
    TreeKernel, TreeKernelParams, VectorBasicKernel,
};

/// Question/answer forest table: question PT, BOW, POS, PTs, PAS, then the
/// same for the answer
const QA_TABLE: &str = r#"
TKP tree_kernel_params[MAX_NUMBER_OF_TREES];/*={
//									QUESTION

//   PT  			  BOW				POS
{ACL07_KERNEL,1,.4,.4,1,1}, {ACL07_KERNEL,1,.4,.4,1,1}, {NOKERNEL,1,.4,1,1,1},{NOKERNEL,1,.4,1,1,1},{NOKERNEL,1,.4,1,1,1},	// 0-4

// PTs
{NOKERNEL,1,.4,1,1,1},		{NOKERNEL,1,.4,1,1,1},		{NOKERNEL,1,.4,1,1,1},{NOKERNEL,1,.4,1,1,1},{NOKERNEL,1,.4,1,1,1},		// 5-9

// PAS
{NOKERNEL,1,.4,1,1,1},		{NOKERNEL,1,.4,1,1,1},		{NOKERNEL,1,.4,1,1,1},{NOKERNEL,1,.4,1,1,1},{NOKERNEL,1,.4,1,1,1},		// 10-14

//									ANSWER

//    PT			 BOW            POS
{ACL07_KERNEL,1,.4,1,1,1}, {ACL07_KERNEL,1,.4,1,1,1},	{NOKERNEL,1,.4,1,1,1},{NOKERNEL,1,.4,1,1,1},{NOKERNEL,1,.4,1,1,1},			// 15-19

//			PAS0					  PAS1							PAS2					PAS3			PAS4
{ACL07_KERNEL,1,.4,1,1,1}, {ACL07_KERNEL,1,.4,1,1,1},	{ACL07_KERNEL,1,.4,1,1,1},{NOKERNEL,1,.4,1,1,1},{NOKERNEL,1,.4,1,1,1},				// 20-24

// END

{END_OF_TREE_KERNELS,0,0,0,0,0}

};
*/
"#;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn document(id: usize, question: &[(usize, f64)], answer: &[(usize, f64)]) -> Document {
    let to_vector = |pairs: &[(usize, f64)]| {
        SparseVector::new(
            pairs.iter().map(|&(i, _)| i).collect(),
            pairs.iter().map(|&(_, v)| v).collect(),
        )
    };
    Document::new(id, vec![to_vector(question), to_vector(answer)])
}

fn documents() -> Vec<Document> {
    vec![
        document(0, &[(1, 1.0), (4, 0.5)], &[(2, 1.0)]),
        document(1, &[(1, 0.5), (3, 1.0)], &[(2, 0.5), (7, 1.0)]),
        document(2, &[(4, 2.0)], &[(7, 0.25)]),
    ]
}

/// Tree values for every document pair on slots 0-7, distinct per slot
fn tree_values(n_docs: usize) -> PrecomputedTreeKernel {
    let mut trees = PrecomputedTreeKernel::new();
    for a in 0..n_docs {
        for b in a..n_docs {
            for slot in 0..8 {
                let value = 1.0 + (a + b) as f64 * 0.5 + slot as f64 * 0.125;
                trees.insert_slot(a, b, slot, value);
            }
        }
    }
    trees
}

fn active_table(n: usize) -> ParameterTable {
    ParameterTable::new(
        (0..n)
            .map(|slot| {
                TreeKernelParams::new(
                    KernelFamily::SubsetTree,
                    1,
                    0.4,
                    1.0,
                    1.0 + slot as f64 * 0.1,
                    true,
                )
            })
            .collect(),
    )
    .expect("valid table")
}

#[test]
fn test_legacy_question_answer_table() {
    init_logging();
    let table = ParameterTable::from_legacy_str(QA_TABLE).expect("table should parse");

    assert_eq!(table.len(), 25);
    assert_eq!(table.active_slots(), vec![0, 1, 15, 16, 20, 21, 22]);
    assert_eq!(
        table[0],
        TreeKernelParams::new(KernelFamily::Acl07, 1, 0.4, 0.4, 1.0, true)
    );
    assert_eq!(table[15].mu, 1.0);
    assert!(table[24].family.is_excluded());
}

#[test]
fn test_single_blend_matches_formula() {
    init_logging();
    let docs = documents();
    let table = ParameterTable::from_legacy_str(QA_TABLE).unwrap();
    let trees = tree_values(docs.len());
    let basic = VectorBasicKernel::linear();
    // Evaluators borrowed, not moved
    let combiner = KernelCombiner::single(table.clone(), &trees, &basic).unwrap();

    for a in &docs {
        for b in &docs {
            let settings = KernelSettings::from(&table[0]);
            let tree = trees.evaluate(&settings, a, b, 0, 0).unwrap();
            let flat = basic.evaluate(a, b, 0, 0).unwrap() + basic.evaluate(a, b, 1, 1).unwrap();
            let expected = 0.23 * flat * flat + 0.77 * table[0].weight * tree;

            assert_relative_eq!(combiner.compute(a, b).unwrap(), expected, epsilon = 1e-12);
        }
    }
}

#[test]
fn test_multi_slot_blend_matches_formula() {
    init_logging();
    let docs = documents();
    let table = active_table(8);
    let trees = tree_values(docs.len());
    let basic = VectorBasicKernel::linear();
    let combiner =
        KernelCombiner::multi_slot(table.clone(), trees.clone(), basic.clone()).unwrap();

    for a in &docs {
        for b in &docs {
            let tree_sum: f64 = [0, 2, 3, 4, 5, 6, 7]
                .iter()
                .map(|&s| {
                    let settings = KernelSettings::from(&table[s]);
                    table[s].weight * trees.evaluate(&settings, a, b, s, s).unwrap()
                })
                .sum();
            let flat = basic.evaluate(a, b, 0, 0).unwrap() + basic.evaluate(a, b, 1, 1).unwrap();
            let expected = 0.8 * tree_sum + 0.2 * flat * flat;

            assert_relative_eq!(combiner.compute(a, b).unwrap(), expected, epsilon = 1e-12);
        }
    }
}

#[test]
fn test_multi_slot_blend_on_question_answer_table() {
    // Slots 2-7 are excluded in the QA table, only slot 0 contributes
    let docs = documents();
    let table = ParameterTable::from_legacy_str(QA_TABLE).unwrap();
    let mut trees = PrecomputedTreeKernel::new();
    trees.insert_slot(0, 1, 0, 3.0);

    let combiner =
        KernelCombiner::multi_slot(table, trees, VectorBasicKernel::linear()).unwrap();

    // flat = 0.5 (question) + 0.5 (answer)
    let k = combiner.compute(&docs[0], &docs[1]).unwrap();
    assert_relative_eq!(k, 0.8 * 3.0 + 0.2 * 1.0, epsilon = 1e-12);
}

#[test]
fn test_worked_example() {
    let table = ParameterTable::new(vec![TreeKernelParams::new(
        KernelFamily::SubsetTree,
        1,
        0.4,
        1.0,
        1.0,
        true,
    )])
    .unwrap();
    let mut trees = PrecomputedTreeKernel::new();
    trees.insert_slot(0, 1, 0, 2.0);

    let a = document(0, &[(0, 1.0)], &[(0, 1.0)]);
    let b = document(1, &[(0, 1.0)], &[(0, 0.5)]);

    let combiner = KernelCombiner::single(table, trees, VectorBasicKernel::linear()).unwrap();
    assert_relative_eq!(combiner.compute(&a, &b).unwrap(), 2.0575, epsilon = 1e-12);
}

#[test]
fn test_symmetry_and_determinism() {
    let docs = documents();
    let combiner = KernelCombiner::multi_slot(
        active_table(8),
        tree_values(docs.len()),
        VectorBasicKernel::linear(),
    )
    .unwrap();

    for a in &docs {
        for b in &docs {
            let ab = combiner.compute(a, b).unwrap();
            let ba = combiner.compute(b, a).unwrap();
            assert_relative_eq!(ab, ba, epsilon = 1e-12);
            assert_eq!(ab, combiner.compute(a, b).unwrap());
        }
    }
}

#[test]
fn test_concurrent_evaluation_matches_sequential() {
    let docs = documents();
    let combiner = KernelCombiner::multi_slot(
        active_table(8),
        tree_values(docs.len()),
        VectorBasicKernel::linear(),
    )
    .unwrap();

    let sequential: Vec<f64> = docs
        .iter()
        .flat_map(|a| docs.iter().map(|b| combiner.compute(a, b).unwrap()))
        .collect();

    let concurrent: Vec<Vec<f64>> = std::thread::scope(|scope| {
        let handles: Vec<_> = docs
            .iter()
            .map(|a| {
                let combiner = &combiner;
                let docs = &docs;
                scope.spawn(move || {
                    docs.iter()
                        .map(|b| combiner.compute(a, b).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(concurrent.concat(), sequential);
}

#[test]
fn test_missing_tree_value_propagates() {
    let docs = documents();
    let mut trees = PrecomputedTreeKernel::new();
    trees.insert_slot(0, 0, 0, 1.0);

    let combiner =
        KernelCombiner::single(active_table(1), trees, VectorBasicKernel::linear()).unwrap();

    assert!(combiner.compute(&docs[0], &docs[0]).is_ok());
    assert!(matches!(
        combiner.compute(&docs[0], &docs[2]),
        Err(KernelError::MissingSubKernel {
            doc_a: 0,
            doc_b: 2,
            ..
        })
    ));
}

#[test]
fn test_missing_feature_set_propagates() {
    let mut trees = PrecomputedTreeKernel::new();
    trees.insert_slot(0, 1, 0, 1.0);
    let a = Document::new(0, vec![SparseVector::new(vec![0], vec![1.0])]);
    let b = Document::new(1, vec![SparseVector::new(vec![0], vec![1.0])]);

    let combiner =
        KernelCombiner::single(active_table(1), trees, VectorBasicKernel::linear()).unwrap();

    assert!(matches!(
        combiner.compute(&a, &b),
        Err(KernelError::FeatureSetOutOfRange { index: 1, .. })
    ));
}

#[test]
fn test_gram_matrix_with_combiner() {
    init_logging();
    let docs = documents();
    let combiner = KernelCombiner::single(
        ParameterTable::from_legacy_str(QA_TABLE).unwrap(),
        tree_values(docs.len()),
        VectorBasicKernel::linear(),
    )
    .unwrap();

    let mut cache = KernelCache::new(64);
    let gram = GramMatrix::compute(&combiner, &docs, &mut cache).unwrap();

    assert_eq!(gram.size(), 3);
    for i in 0..3 {
        for j in 0..3 {
            assert_eq!(gram.get(i, j), gram.get(j, i));
            assert_relative_eq!(
                gram.get(i, j),
                combiner.compute(&docs[i], &docs[j]).unwrap(),
                epsilon = 1e-12
            );
        }
    }
    assert_eq!(cache.stats().size, 6);
}

#[test]
fn test_custom_blend_only_flat() {
    let docs = documents();
    let blend = BlendConfig {
        slots: vec![],
        flat_sets: vec![0],
        tree_coefficient: 0.0,
        flat_coefficient: 1.0,
    };
    let combiner = KernelCombiner::new(
        active_table(1),
        blend,
        PrecomputedTreeKernel::new(),
        VectorBasicKernel::linear(),
    )
    .unwrap();

    // question dot product of doc 0 and 1 = 0.5, squared
    assert_relative_eq!(
        combiner.compute(&docs[0], &docs[1]).unwrap(),
        0.25,
        epsilon = 1e-12
    );
}
