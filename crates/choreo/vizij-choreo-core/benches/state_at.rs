use criterion::{black_box, criterion_group, criterion_main, Criterion};
use vizij_choreo_core::{CommandDraft, Config, Geometry, NodeBuilder, NodeId, Player};

/// A grid of dots with a few overlapping commands each, grouped in rows.
fn build_player(rows: usize, cols: usize) -> Player {
    let mut p = Player::new(Config::default());
    for r in 0..rows {
        let mut row: Vec<NodeId> = Vec::with_capacity(cols);
        for c in 0..cols {
            let id = p
                .add_node(
                    NodeBuilder::new(Geometry::circle(0.1))
                        .at([c as f32 * 0.3, r as f32 * 0.3, 0.0])
                        .hidden(),
                )
                .expect("node");
            let t0 = (r * cols + c) as f32 * 0.01;
            p.schedule(&CommandDraft::create(&[id]).start(t0)).expect("create");
            p.schedule(&CommandDraft::shift(&[id], [0.0, 1.0, 0.0]).start(t0 + 0.5))
                .expect("shift");
            p.schedule(&CommandDraft::scale_by(&[id], 1.5).start(t0 + 1.0))
                .expect("scale");
            row.push(id);
        }
        let g = p.group(&row).expect("group");
        p.schedule(&CommandDraft::rotate(&[g], 1.0).start(2.0).duration(3.0))
            .expect("rotate");
    }
    p
}

fn bench_state_at(c: &mut Criterion) {
    let player = build_player(10, 20);
    let end = player.total_duration();
    c.bench_function("state_at_200_nodes_mid", |b| {
        b.iter(|| black_box(player.state_at(black_box(end * 0.5))))
    });
    c.bench_function("state_at_200_nodes_end", |b| {
        b.iter(|| black_box(player.state_at(black_box(end))))
    });
}

criterion_group!(benches, bench_state_at);
criterion_main!(benches);
