use crate::dag::DagView;
use crate::primitives::{fnv1a, keccak_f800, random_op, Kiss99, FNV_OFFSET};

/// Number of DAG reads performed per mix search.
pub const DAG_LOADS: usize = 64;
/// Number of random-math operations applied per DAG read.
pub const MATH_OPS: usize = 16;

/// Runs the per-nonce mix search kernel and returns the top 64 bits of the
/// final Keccak state (`hash_high`).
///
/// Pure: identical `(header, nonce, dag)` inputs always yield the same
/// result, on any implementation that follows this same sequence.
pub fn mix_hash<D: DagView + ?Sized>(header: &[u32; 20], nonce: u64, dag: &D) -> u64 {
    let mut state = [0u32; 25];
    state[0..20].copy_from_slice(header);
    state[19] = nonce as u32;
    state[20] = (nonce >> 32) as u32;
    for s in state[21..25].iter_mut() {
        *s = 0;
    }
    keccak_f800(&mut state);

    let mut mix = [0u32; 64];
    for (k, m) in mix.iter_mut().enumerate() {
        *m = state[k % 25];
    }

    let z = fnv1a(FNV_OFFSET, state[0]);
    let w = fnv1a(z, state[1]);
    let jsr = fnv1a(w, state[2]);
    let jcong = fnv1a(jsr, state[3]);
    let mut rng = Kiss99::new(z, w, jsr, jcong);

    let n_dag = dag.n_items();
    for round in 0..DAG_LOADS {
        let dag_idx =
            fnv1a(round as u32 ^ mix[round % 64], mix[(round + 1) % 64]) as u64 % n_dag;
        let dag_data = dag.item(dag_idx);
        for k in 0..16 {
            mix[k] = fnv1a(mix[k], dag_data[k]);
        }

        for _ in 0..MATH_OPS {
            let s1 = (rng.next() % 64) as usize;
            let s2 = (rng.next() % 64) as usize;
            let d = (rng.next() % 64) as usize;
            let op_type = rng.next();
            mix[d] = random_op(mix[s1], mix[s2], op_type);
        }
    }

    for i in 0..8 {
        let mut acc = mix[i * 8];
        for j in 1..8 {
            acc = fnv1a(acc, mix[i * 8 + j]);
        }
        state[i] = acc;
    }
    for s in state[8..25].iter_mut() {
        *s = 0;
    }
    keccak_f800(&mut state);

    ((state[0] as u64) << 32) | state[1] as u64
}
