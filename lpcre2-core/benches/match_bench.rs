use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lpcre2_core::options;
use rayon::prelude::*;

fn bench_compile_once_match(c: &mut Criterion) {
    let pattern =
        lpcre2_core::compile(br"module([0-9]{3})/file_([0-9]{3})\.rs", 0).expect("compile");
    let lines: Vec<Vec<u8>> = (0..2000)
        .map(|i| format!("/home/user/projects/repo/src/module{}/file_{}.rs", i, i).into_bytes())
        .collect();

    c.bench_function("match_compile_once_match_at", |b| {
        b.iter(|| {
            for line in &lines {
                let _ = black_box(pattern.match_at(line, 0, 0));
            }
        })
    });

    c.bench_function("match_compile_once_all_groups", |b| {
        b.iter(|| {
            for line in &lines {
                if let Ok(Some(m)) = pattern.match_at(line, 0, 0) {
                    let _ = black_box(m.all_groups(line));
                }
            }
        })
    });
}

fn bench_substitute(c: &mut Criterion) {
    let include = br#"^(\s*#\s*include\s+"[-.\w/]+")"#;
    let pattern = lpcre2_core::compile(include, options::MULTILINE).expect("compile");
    let source = (0..500)
        .map(|i| format!("#include \"dir/header_{}.h\"\nint x{} = {};\n", i, i, i))
        .collect::<String>();
    let subject = source.as_bytes();

    c.bench_function("substitute_amalgamate_global", |b| {
        b.iter(|| {
            let out =
                pattern.substitute(subject, b"/* AMALGAMATE: $1 */", options::SUBSTITUTE_GLOBAL);
            let _ = black_box(out);
        })
    });
}

fn bench_multi_threaded_matches(c: &mut Criterion) {
    let pattern = lpcre2_core::compile(b"ab([0-9]+)", 0).expect("compile");
    let texts: Vec<Vec<u8>> = (0..10000).map(|i| format!("xxab{}yy", i).into_bytes()).collect();

    c.bench_function("match_multi_threaded_par_iter", |b| {
        b.iter(|| {
            texts.par_iter().for_each(|t| {
                let _ = black_box(pattern.match_at(t, 0, 0));
            });
        })
    });
}

criterion_group!(benches, bench_compile_once_match, bench_substitute, bench_multi_threaded_matches);
criterion_main!(benches);
