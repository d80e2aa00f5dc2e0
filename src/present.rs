//! Human-readable listing of collected objects

use crate::graph::Graph;
use crate::object::{kind_name, Body, Entity};

fn known_as(graph: &Graph, idx: usize) -> String {
    let names: Vec<&str> = graph
        .names_referenced_by(idx)
        .iter()
        .map(String::as_str)
        .collect();
    format!("known as {{{}}}\n", names.join(", "))
}

fn id_list<'a>(entities: impl Iterator<Item = &'a Entity>) -> Option<String> {
    let ids: Vec<&str> = entities.map(Entity::id).collect();
    (!ids.is_empty()).then(|| ids.join(", "))
}

/// Describe the entity at `idx`: who it refers to, who refers to it, and
/// the names others know it by.
pub fn describe(graph: &Graph, idx: usize) -> String {
    let entity = graph.entity(idx);
    let mut out = format!("****\n{} {}\n", kind_name(entity.kind()), entity.hash());
    if let Some(ids) = id_list(graph.referenced(idx)) {
        out.push_str(&format!("refers to {ids}\n"));
    }
    if let Some(ids) = id_list(graph.referrers(idx)) {
        out.push_str(&format!("referred to by {ids}\n"));
    }

    let lines = entity.lines();
    match entity.body() {
        Body::Tag { .. } => {
            if let Some(label) = entity.tag_label() {
                out.push_str(&format!("named {label}\n"));
            }
            for line in lines.iter().take_while(|l| !l.is_empty()) {
                out.push_str(&format!("-> {line}\n"));
            }
        }
        Body::Commit { labels } => {
            if !labels.is_empty() {
                out.push_str(&format!("labels {}\n", labels.join(", ")));
            }
            let mut in_message = false;
            for line in lines {
                if in_message {
                    out.push_str(line);
                    out.push('\n');
                } else if line.is_empty() {
                    in_message = true;
                } else if line.starts_with("tree ") || line.starts_with("parent ") {
                    out.push_str(&format!("-> {line}\n"));
                }
            }
        }
        Body::Tree => {
            if graph.names_referenced_by(idx).is_empty() {
                out.push_str("root tree\n");
            } else {
                out.push_str(&known_as(graph, idx));
            }
            for line in lines.iter().filter(|l| !l.is_empty()) {
                out.push_str(&format!("-> {line}\n"));
            }
        }
        Body::Blob => {
            out.push_str(&known_as(graph, idx));
            if let Some(first) = entity.content().and_then(<[String]>::first) {
                out.push_str(&format!("-> first line: {first}\n"));
            }
        }
    }
    out
}

/// Print every entity to stdout in graph order.
pub fn print_all(graph: &Graph) {
    for idx in 0..graph.entities().len() {
        print!("{}", describe(graph, idx));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::tests::{
        sample_repository, BLOB, COMMIT1, COMMIT2, TAG, TREE1, TREE2,
    };

    fn describe_hash(hash: &str) -> String {
        let graph = Graph::build(sample_repository().into_entities());
        let idx = graph.position(hash).unwrap();
        describe(&graph, idx)
    }

    fn short(hash: &str) -> &str {
        &hash[..6]
    }

    #[test]
    fn test_blob_lists_names() {
        let text = describe_hash(BLOB);
        assert!(text.starts_with(&format!("****\nblob {BLOB}\n")));
        assert!(text.contains("known as {a, b}\n"));
        assert!(text.contains("-> first line: same content\n"));
        assert!(!text.contains("refers to"));
    }

    #[test]
    fn test_blob_lists_every_referring_tree() {
        let text = describe_hash(BLOB);
        assert!(text.contains(&format!(
            "referred to by {}, {}\n",
            short(TREE2),
            short(TREE1)
        )));
    }

    #[test]
    fn test_root_tree() {
        let text = describe_hash(TREE1);
        assert!(text.contains("root tree\n"));
        assert!(text.contains(&format!("-> 100644 blob {BLOB}\ta\n")));
        assert!(text.contains(&format!("refers to {}\n", short(BLOB))));
    }

    #[test]
    fn test_commit_message_and_labels() {
        let text = describe_hash(COMMIT2);
        assert!(text.contains("labels main, release\n"));
        assert!(text.contains("-> parent "));
        assert!(text.ends_with("second\n"));
    }

    #[test]
    fn test_commit_links_in_entity_order() {
        let text = describe_hash(COMMIT2);
        assert!(text.contains(&format!(
            "refers to {}, {}\n",
            short(TREE2),
            short(COMMIT1)
        )));
        assert!(text.contains(&format!("referred to by {}\n", short(TAG))));
    }

    #[test]
    fn test_tag_header_only() {
        let text = describe_hash(TAG);
        assert!(text.contains("named v1\n"));
        assert!(text.contains("-> tag v1\n"));
        assert!(!text.contains("release\n"));
        assert!(!text.contains("referred to by"));
    }
}
