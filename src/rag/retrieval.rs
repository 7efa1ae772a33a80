use super::store::ScoredChunk;

/// Renders retrieved chunks as a numbered reference block for the prompt.
///
/// Order is the index's ranking; doubled quotes left over from CSV-style
/// exports are collapsed.
pub fn format_reference_block(hits: &[ScoredChunk]) -> String {
    let mut block = String::new();
    for (i, hit) in hits.iter().enumerate() {
        block.push_str(&format!("问卷{}. {}\n", i + 1, hit.chunk.content));
    }
    block.replace("\"\"", "\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::store::IndexedChunk;

    fn hit(ordinal: usize, content: &str, score: f32) -> ScoredChunk {
        ScoredChunk {
            chunk: IndexedChunk {
                chunk_id: IndexedChunk::chunk_id_for(ordinal),
                ordinal,
                content: content.to_string(),
                embedding: Vec::new(),
            },
            score,
        }
    }

    #[test]
    fn chunks_are_numbered_in_ranking_order() {
        let block = format_reference_block(&[
            hit(7, "信用卡满意度", 0.9),
            hit(2, "理财需求", 0.5),
        ]);
        assert_eq!(block, "问卷1. 信用卡满意度\n问卷2. 理财需求\n");
    }

    #[test]
    fn doubled_quotes_are_collapsed() {
        let block = format_reference_block(&[hit(0, r#"{""survey_name"": ""x""}"#, 1.0)]);
        assert_eq!(block, "问卷1. {\"survey_name\": \"x\"}\n");
    }

    #[test]
    fn no_hits_give_an_empty_block() {
        assert_eq!(format_reference_block(&[]), "");
    }
}
