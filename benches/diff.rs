//! Performance benchmarks for dictionary diffing and tree building.
//!
//! Run with: `cargo bench --bench diff`
//!
//! ## Performance Targets
//!
//! | Operation | Target | Notes |
//! |-----------|--------|-------|
//! | Diff, 40 files x 50 fields | <5ms | Typical release-to-release comparison |
//! | Self diff | <1ms | Equal-content short-circuit |
//! | Tree build, 40 files | <1ms | Edge derivation + traversal |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use dictionary_kernel::{
    build_tree, compute_diff, derive_parent_edges, Dictionary, Field, FileType, Relation,
    Restriction, DEFAULT_FILE_ORDER,
};

/// Build a chain-shaped dictionary: each file relates to the previous one.
fn make_dictionary(version: &str, files: usize, fields: usize, variant: usize) -> Dictionary {
    let names: Vec<String> = (0..files)
        .map(|i| {
            DEFAULT_FILE_ORDER
                .get(i)
                .map(|n| n.to_string())
                .unwrap_or_else(|| format!("custom_{i}"))
        })
        .collect();

    let files = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let mut file = FileType::new(name.as_str())
                .with_label(format!("File {i}"))
                .with_pattern(format!("^{name}\\.txt$"));
            if i > 0 {
                file = file.with_relation(Relation::new(
                    names[i - 1].as_str(),
                    vec!["key".to_string()],
                    vec!["key".to_string()],
                ));
            }
            (0..fields).fold(file, |f, j| {
                let mut field = Field::new(format!("field_{j}"))
                    .with_restriction(Restriction::required((j + variant) % 3 == 0));
                if j % 4 == 0 {
                    field = field.with_restriction(Restriction::codelist(format!("list_{j}")));
                }
                if (j + variant) % 7 == 0 {
                    field = field.with_restriction(Restriction::regex("^[0-9]+$"));
                }
                f.with_field(field)
            })
        })
        .collect();

    Dictionary {
        version: version.to_string(),
        files,
    }
}

fn bench_diff(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff");

    for &(files, fields) in &[(10usize, 20usize), (40, 50)] {
        let from = make_dictionary("0.10a", files, fields, 0);
        let to = make_dictionary("0.10b", files, fields, 1);

        group.throughput(Throughput::Elements((files * fields) as u64));
        group.bench_with_input(
            BenchmarkId::new("changed", format!("{files}x{fields}")),
            &(from.clone(), to),
            |b, (from, to)| b.iter(|| compute_diff(black_box(from), black_box(to))),
        );
        group.bench_with_input(
            BenchmarkId::new("identical", format!("{files}x{fields}")),
            &from,
            |b, dict| b.iter(|| compute_diff(black_box(dict), black_box(dict))),
        );
    }

    group.finish();
}

fn bench_tree(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree");

    for &files in &[10usize, 40] {
        let dict = make_dictionary("0.10a", files, 5, 0);
        let root = dict.files[0].name.clone();

        group.bench_with_input(BenchmarkId::new("build", files), &dict, |b, dict| {
            b.iter(|| {
                let edges = derive_parent_edges(black_box(dict));
                build_tree(&root, &edges, dict)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_diff, bench_tree);
criterion_main!(benches);
