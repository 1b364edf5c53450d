use agent_stream_parser::{BlockKind, StreamAssembler, StreamEnvelope, parse_structured_content};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Streaming Envelope Assembly Demo\n");
    println!("{}", "=".repeat(80));

    // A response as the agent backend would stream it, one envelope per line
    let envelopes = [
        serde_json::json!({"type": "status", "data": {"stage": "planning"}}),
        serde_json::json!({"type": "content", "data": "<thinking>Load the file, then plot.</thinking>\n"}),
        serde_json::json!({"type": "content", "data": "<tool_call><tool_name>plot</tool_name>"}),
        serde_json::json!({"type": "content", "data": "<tool_result>{\"type\":\"bar\",\"data\":[{\"label\":\"A\",\"value\":3}]}</tool_result></tool_call>\n"}),
        serde_json::json!({"type": "content", "data": "<final_answer>A has 3 sales.</final_answer>"}),
    ];
    let mut stream = String::new();
    for envelope in &envelopes {
        stream.push_str(&serde_json::to_string(envelope)?);
        stream.push('\n');
    }
    stream.push_str("Trailing words without a newline");

    println!("\nRaw stream:");
    println!("{}", stream);
    println!("\n{}", "=".repeat(80));

    let mut assembler = StreamAssembler::new();
    let mut text = String::new();
    let chunk_size = 48; // Simulate small network chunks

    for (i, chunk) in stream.as_bytes().chunks(chunk_size).enumerate() {
        println!("Chunk {} ({} bytes)", i + 1, chunk.len());

        let complete = assembler.process_chunk(chunk);
        if complete.is_empty() {
            println!("   Incomplete - buffering...");
            continue;
        }

        for envelope in complete {
            println!("   Envelope: type={} data={}", envelope.kind, envelope.data);
            collect_content(&envelope, &mut text);
        }
    }

    for envelope in assembler.flush() {
        println!("Flushed: type={} data={}", envelope.kind, envelope.data);
        collect_content(&envelope, &mut text);
    }

    println!("\n{}", "=".repeat(80));
    println!("\nParsed blocks:");
    for block in parse_structured_content(&text) {
        let detail = match block.kind() {
            BlockKind::ToolCall => format!(" (tool: {})", block.tool_name().unwrap_or("?")),
            BlockKind::Chart => block
                .normalized_chart()
                .map(|c| format!(" ({} chart, {:?} renderer)", c.chart_type(), c.route()))
                .unwrap_or_default(),
            _ => String::new(),
        };
        println!("  #{} {}{}: {}", block.position(), block.kind(), detail, block.content());
    }

    let stats = assembler.stats();
    println!("\nStatistics:");
    println!("  Processed lines: {}", stats.processed_lines);
    println!("  Buffered bytes: {}", stats.buffer_size);

    Ok(())
}

fn collect_content(envelope: &StreamEnvelope, text: &mut String) {
    if envelope.kind == StreamEnvelope::CONTENT
        && let Some(chunk) = envelope.text()
    {
        text.push_str(chunk);
    }
}
