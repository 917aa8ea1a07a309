/// Deterministic seatings of `n` agents, generated in swap order and capped.
pub struct SeatPermutations {
    permutations: Vec<Vec<usize>>,
}

impl SeatPermutations {
    pub fn new(seats: usize, count: usize) -> Self {
        let limit = count.min(max_permutations(seats));
        let mut permutations = Vec::with_capacity(limit);
        let mut base: Vec<usize> = (0..seats).collect();
        if seats > 0 {
            generate(&mut base, 0, limit, &mut permutations);
        }
        Self { permutations }
    }

    pub fn as_slice(&self) -> &[Vec<usize>] {
        &self.permutations
    }
}

/// `seats!`, the number of distinct seatings.
pub fn max_permutations(seats: usize) -> usize {
    (1..=seats).product()
}

fn generate(data: &mut [usize], start: usize, limit: usize, output: &mut Vec<Vec<usize>>) {
    if output.len() >= limit {
        return;
    }

    if start == data.len() - 1 {
        output.push(data.to_vec());
        return;
    }

    for idx in start..data.len() {
        data.swap(start, idx);
        generate(data, start + 1, limit, output);
        data.swap(start, idx);
        if output.len() >= limit {
            break;
        }
    }
}
