#[cfg(feature = "bench_combine")]
use arcline::{find_loops, union, CombineOptions, LoopOptions, Model, Path};
#[cfg(feature = "bench_combine")]
use std::time::Instant;

#[cfg(not(feature = "bench_combine"))]
fn main() {
    panic!("combine_bench requires --features bench_combine");
}

#[cfg(feature = "bench_combine")]
fn square(x: f64, y: f64, size: f64) -> Model {
    Model::from_paths([
        ("b", Path::line((x, y), (x + size, y))),
        ("r", Path::line((x + size, y), (x + size, y + size))),
        ("t", Path::line((x + size, y + size), (x, y + size))),
        ("l", Path::line((x, y + size), (x, y))),
    ])
}

/// `n` x `n` squares on a 10 unit pitch, each 6 wide, plus a circle per cell
/// offset so it overlaps the square to its upper right.
#[cfg(feature = "bench_combine")]
fn build_grids(n: usize) -> (Model, Model) {
    let mut squares = Model::new();
    let mut circles = Model::new();
    for j in 0..n {
        for i in 0..n {
            let (x, y) = (i as f64 * 10.0, j as f64 * 10.0);
            squares.models.insert(format!("s{}_{}", i, j), square(x, y, 6.0));
            circles.paths.insert(format!("c{}_{}", i, j), Path::circle((x + 6.0, y + 6.0), 3.0));
        }
    }
    (squares, circles)
}

#[cfg(feature = "bench_combine")]
fn main() {
    let _ = env_logger::try_init();
    let args: Vec<String> = std::env::args().collect();
    let mut n = 20usize;
    let mut repeats = 3usize;
    for a in &args[1..] {
        if let Some(val) = a.strip_prefix("--n=") {
            if let Ok(v) = val.parse() {
                n = v;
            }
        } else if let Some(val) = a.strip_prefix("--repeats=") {
            if let Ok(v) = val.parse() {
                repeats = v;
            }
        }
    }

    let (squares, circles) = build_grids(n);
    let mut combine_times: Vec<f64> = Vec::new();
    let mut loop_times: Vec<f64> = Vec::new();
    let mut loops_found = 0;
    for _ in 0..repeats {
        let mut a = squares.clone();
        let mut b = circles.clone();
        let t0 = Instant::now();
        if let Err(e) = union(&mut a, &mut b, &CombineOptions::default()) {
            eprintln!("union failed: {}", e);
            return;
        }
        combine_times.push(t0.elapsed().as_secs_f64() * 1000.0);

        let mut both = Model::new();
        both.models.insert("a".into(), a);
        both.models.insert("b".into(), b);
        let t1 = Instant::now();
        match find_loops(&both, &LoopOptions::default()) {
            Ok(loops) => loops_found = loops.len(),
            Err(e) => {
                eprintln!("find_loops failed: {}", e);
                return;
            }
        }
        loop_times.push(t1.elapsed().as_secs_f64() * 1000.0);
    }
    let avg = |v: &[f64]| if v.is_empty() { 0.0 } else { v.iter().sum::<f64>() / (v.len() as f64) };

    println!(
        "grid={}x{} paths={} avg_union_ms={:.3} avg_loops_ms={:.3} loops={}",
        n,
        n,
        squares.path_count() + circles.path_count(),
        avg(&combine_times),
        avg(&loop_times),
        loops_found
    );
}
