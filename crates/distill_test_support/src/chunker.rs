//! Chunk plans for incremental-equivalence coverage.
//!
//! Deterministic plans (fixed sizes, token-boundary splits) plus seeded fuzz
//! plans for reproducible CI runs.

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ChunkPlan {
    Fixed { size: usize },
    Boundaries { indices: Vec<usize> },
}

impl ChunkPlan {
    pub fn fixed(size: usize) -> Self {
        debug_assert!(size > 0);
        Self::Fixed { size }
    }

    pub fn boundaries(indices: impl Into<Vec<usize>>) -> Self {
        Self::Boundaries {
            indices: indices.into(),
        }
    }

    /// Split `input` into chunks, snapping every cut to a char boundary.
    pub fn apply<'a>(&self, input: &'a str) -> Vec<&'a str> {
        let cuts: Vec<usize> = match self {
            Self::Fixed { size } => (1..)
                .map(|i| i * size)
                .take_while(|&at| at < input.len())
                .collect(),
            Self::Boundaries { indices } => indices.clone(),
        };
        let mut chunks = Vec::with_capacity(cuts.len() + 1);
        let mut start = 0;
        for cut in cuts {
            if cut <= start || cut >= input.len() || !input.is_char_boundary(cut) {
                continue;
            }
            chunks.push(&input[start..cut]);
            start = cut;
        }
        chunks.push(&input[start..]);
        chunks
    }
}

impl std::fmt::Display for ChunkPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fixed { size } => write!(f, "fixed size={size}"),
            Self::Boundaries { indices } => {
                write!(f, "boundaries count={} indices={indices:?}", indices.len())
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct ChunkPlanCase {
    pub label: String,
    pub plan: ChunkPlan,
}

/// Build deterministic + fuzz chunk plans for the given input.
///
/// - Deterministic includes fixed sizes and splits around `<`, `>`, quotes,
///   and `&`.
/// - Fuzz plans are seeded for reproducibility.
pub fn build_chunk_plans(input: &str, fuzz_runs: usize, fuzz_seed: u64) -> Vec<ChunkPlanCase> {
    let mut plans = Vec::new();

    for size in [1usize, 2, 3, 4, 8, 16, 32, 64] {
        plans.push(ChunkPlanCase {
            label: format!("fixed size={size}"),
            plan: ChunkPlan::fixed(size),
        });
    }

    let token_boundaries = token_boundary_indices(input);
    if !token_boundaries.is_empty() {
        plans.push(ChunkPlanCase {
            label: format!("token-boundaries count={}", token_boundaries.len()),
            plan: ChunkPlan::boundaries(token_boundaries.clone()),
        });
    }

    if fuzz_runs > 0 {
        let mut candidates = char_boundaries(input);
        candidates.extend(token_boundaries);
        candidates.sort_unstable();
        candidates.dedup();
        for i in 0..fuzz_runs {
            let seed = fuzz_seed.wrapping_add(i as u64);
            let mut rng = Lcg::new(seed);
            let plan = if candidates.is_empty() {
                // Fallback for empty/1-byte inputs.
                ChunkPlan::fixed(1)
            } else {
                let max = candidates.len().clamp(1, 32);
                let mut picks = candidates.clone();
                rng.shuffle(&mut picks);
                let count = 1 + rng.gen_range(max);
                picks.truncate(count);
                picks.sort_unstable();
                picks.dedup();
                ChunkPlan::boundaries(picks)
            };
            plans.push(ChunkPlanCase {
                label: format!("fuzz boundaries seed=0x{seed:016x}"),
                plan,
            });
        }
    }

    plans
}

fn token_boundary_indices(input: &str) -> Vec<usize> {
    let bytes = input.as_bytes();
    let mut out = Vec::new();
    for (i, &b) in bytes.iter().enumerate() {
        if matches!(b, b'<' | b'>' | b'"' | b'\'' | b'&') {
            out.push(i);
            if i + 1 < bytes.len() {
                out.push(i + 1);
            }
        }
    }
    out.retain(|&i| i != 0 && i < input.len() && input.is_char_boundary(i));
    out.sort_unstable();
    out.dedup();
    out
}

fn char_boundaries(input: &str) -> Vec<usize> {
    input
        .char_indices()
        .map(|(i, _)| i)
        .filter(|&i| i != 0)
        .collect()
}

pub struct Lcg {
    state: u64,
}

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        self.state
    }

    pub fn gen_range(&mut self, upper: usize) -> usize {
        if upper == 0 {
            return 0;
        }
        (self.next_u64() >> 32) as usize % upper
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        if items.len() < 2 {
            return;
        }
        for i in (1..items.len()).rev() {
            let j = self.gen_range(i + 1);
            items.swap(i, j);
        }
    }
}
