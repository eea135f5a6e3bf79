//! Seeded random graph generation for benches, stress tests, and the CLI.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::model::{EdgeRecord, PropertyValue, VertexRecord};

/// Generates social-network-shaped property graphs, deterministic under a
/// seed.
pub struct DataGenerator {
    rng: ChaCha8Rng,
}

impl DataGenerator {
    /// Creates a generator seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Generates `num_users` user vertices with roughly `avg_connections`
    /// outgoing "follows" edges each. Adjacency is mirrored: every edge
    /// appears in the source's outgoing list and the target's incoming
    /// list. Vertex ids start at 1.
    pub fn generate_social_network(
        &mut self,
        num_users: usize,
        avg_connections: usize,
    ) -> Vec<VertexRecord> {
        let mut vertices: Vec<VertexRecord> = Vec::with_capacity(num_users);

        for i in 0..num_users {
            let mut vertex = VertexRecord::new((i + 1) as u64);
            vertex.properties.insert(
                "name".to_string(),
                PropertyValue::String(format!("User{}", i + 1)),
            );
            vertex.properties.insert(
                "age".to_string(),
                PropertyValue::Int(self.rng.gen_range(18..65)),
            );
            vertex.properties.insert(
                "active".to_string(),
                PropertyValue::Bool(self.rng.gen_bool(0.8)),
            );
            vertex.properties.insert(
                "score".to_string(),
                PropertyValue::Float(self.rng.gen_range(0.0..1000.0)),
            );
            vertices.push(vertex);
        }

        if num_users < 2 || avg_connections == 0 {
            return vertices;
        }

        for i in 0..num_users {
            let num_connections = self.rng.gen_range(0..avg_connections * 2);
            for _ in 0..num_connections {
                let target = self.rng.gen_range(0..num_users);
                if target == i {
                    continue;
                }
                let source_id = (i + 1) as u64;
                let target_id = (target + 1) as u64;
                let mut edge = EdgeRecord::new(source_id, target_id, "follows");
                edge.properties.insert(
                    "since".to_string(),
                    PropertyValue::Int(self.rng.gen_range(2005..2026)),
                );
                vertices[i].outgoing.push(edge.clone());
                vertices[target].incoming.push(edge);
            }
        }

        vertices
    }

    /// Marks roughly `fraction` of the vertices with a path annotation.
    /// Returns how many were marked.
    pub fn annotate_fraction(&mut self, vertices: &mut [VertexRecord], fraction: f64) -> usize {
        let probability = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let mut marked = 0;
        for vertex in vertices.iter_mut() {
            if self.rng.gen_bool(probability) {
                vertex.start_path();
                marked += 1;
            }
        }
        marked
    }
}
