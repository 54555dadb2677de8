//! Performance benchmarks for ghwalk

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use ghwalk::{GlobFilter, MemoryContents, WalkControl, WalkOptions, Walker};

/// A tree `width` directories wide and `depth` levels deep, with `files`
/// files in every directory.
fn generate_tree(width: usize, depth: usize, files: usize) -> MemoryContents {
    fn fill(api: MemoryContents, prefix: &str, width: usize, depth: usize, files: usize) -> MemoryContents {
        let mut api = api;
        for f in (0..files).rev() {
            api = api.file(&format!("{}/file_{:03}.rs", prefix, f), "fn main() {}\n");
        }
        if depth == 0 {
            return api;
        }
        for d in (0..width).rev() {
            api = fill(api, &format!("{}/dir_{:02}", prefix, d), width, depth - 1, files);
        }
        api
    }
    fill(MemoryContents::new(), "src", width, depth, files)
}

fn bench_walk(c: &mut Criterion) {
    let api = generate_tree(4, 3, 10);
    let mut group = c.benchmark_group("walk");

    group.bench_function("listing_only", |b| {
        let walker = Walker::new(&api, "owner", "repo");
        b.iter(|| {
            api.reset_calls();
            let mut count = 0usize;
            walker
                .walk(black_box("src"), |_, _, _| {
                    count += 1;
                    WalkControl::Continue
                })
                .unwrap();
            count
        })
    });

    group.bench_function("reverse", |b| {
        let walker = Walker::new(&api, "owner", "repo")
            .with_options(WalkOptions::new().with_reverse(true));
        b.iter(|| {
            api.reset_calls();
            walker
                .walk(black_box("src"), |_, _, _| WalkControl::Continue)
                .unwrap()
        })
    });

    group.bench_function("file_detail", |b| {
        let walker = Walker::new(&api, "owner", "repo")
            .with_options(WalkOptions::new().with_file_detail(true));
        b.iter(|| {
            api.reset_calls();
            walker
                .walk(black_box("src"), |_, entry, _| {
                    if let Some(entry) = entry.filter(|e| !e.is_dir()) {
                        black_box(entry.content().ok());
                    }
                    WalkControl::Continue
                })
                .unwrap()
        })
    });

    group.bench_function("glob_filtered", |b| {
        let walker = Walker::new(&api, "owner", "repo")
            .with_filter(GlobFilter::new(["dir_0[0-1]", "file_00*"]).unwrap());
        b.iter(|| {
            api.reset_calls();
            walker
                .walk(black_box("src"), |_, _, _| WalkControl::Continue)
                .unwrap()
        })
    });

    group.finish();
}

criterion_group!(benches, bench_walk);
criterion_main!(benches);
