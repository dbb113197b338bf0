use criterion::{Criterion, black_box, criterion_group, criterion_main};

// We can't easily benchmark the GUI parts, but we can benchmark the hot loops
// (glyph synthesis and the particle tick) with minimal versions here

/// Minimal glyph synthesis: an A-like rule evaluated over a w x h grid
fn synthesize(w: i32, h: i32) -> Vec<Vec<u8>> {
    let mx = (w - 1) / 2;
    let my = h / 2;
    let last_x = w - 1;
    (0..h)
        .map(|y| {
            (0..w)
                .map(|x| {
                    let bit = (y == 0 && x > 0 && x < last_x)
                        || (y > 0 && (x == 0 || x == last_x))
                        || (y == my && x > 0 && x < last_x)
                        || (y == my && x == mx);
                    bit as u8
                })
                .collect()
        })
        .collect()
}

fn benchmark_synthesis(c: &mut Criterion) {
    c.bench_function("synthesize_26_glyphs_heavy", |b| {
        b.iter(|| {
            let mut total = 0usize;
            for _ in 0..26 {
                let m = synthesize(black_box(18), black_box(33));
                total += m.iter().flatten().filter(|&&v| v == 1).count();
            }
            black_box(total)
        })
    });
}

struct P {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
}

fn benchmark_particle_tick(c: &mut Criterion) {
    c.bench_function("particle_tick_500", |b| {
        let seed: Vec<P> = (0..500)
            .map(|i| P {
                x: (i % 40) as f32 * 18.0,
                y: (i / 40) as f32 * 18.0,
                vx: ((i * 7) % 11) as f32 - 5.0,
                vy: ((i * 13) % 11) as f32 - 5.0,
            })
            .collect();

        b.iter(|| {
            let mut particles: Vec<P> = seed
                .iter()
                .map(|p| P {
                    x: p.x,
                    y: p.y,
                    vx: p.vx,
                    vy: p.vy,
                })
                .collect();

            for i in 0..particles.len() {
                let p = &mut particles[i];
                p.vx *= 0.98;
                p.vy *= 0.98;
                p.x += p.vx;
                p.y += p.vy;
                if p.y > 584.0 {
                    p.y = 584.0;
                    p.vy *= -0.8;
                }

                for j in (i + 1)..particles.len() {
                    let (head, tail) = particles.split_at_mut(j);
                    let a = &mut head[i];
                    let b = &mut tail[0];
                    let dx = a.x - b.x;
                    let dy = a.y - b.y;
                    let dist = (dx * dx + dy * dy).sqrt();
                    if dist < 16.0 {
                        let angle = dy.atan2(dx);
                        a.vx += angle.cos() * 0.5;
                        a.vy += angle.sin() * 0.5;
                        b.vx -= angle.cos() * 0.5;
                        b.vy -= angle.sin() * 0.5;
                    }
                }
            }
            black_box(particles.len())
        })
    });
}

criterion_group!(benches, benchmark_synthesis, benchmark_particle_tick);
criterion_main!(benches);
