fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use dataplane_protocol::{
        FileDataChunk, FileDataChunkContent, FileDataChunkHeader, FileMeta, MessageMeta,
        file_data_chunk,
    };
    use prost::Message;

    /// Encodes `value`, compares it with the expected hex bytes, then decodes
    /// the fixture back and compares values.
    fn wire_test<T>(name: &str, value: &T, expected_hex: &str)
    where
        T: Message + Default + PartialEq + std::fmt::Debug,
    {
        let encoded = hex::encode(value.encode_to_vec());
        assert_eq!(
            encoded, expected_hex,
            "encoding mismatch for {name}:\n  want: {expected_hex}\n  got:  {encoded}"
        );

        let bytes = hex::decode(expected_hex)
            .unwrap_or_else(|e| panic!("bad fixture hex for {name}: {e}"));
        let decoded =
            T::decode(bytes.as_slice()).unwrap_or_else(|e| panic!("failed to decode {name}: {e}"));
        assert_eq!(&decoded, value, "decode mismatch for {name}");
    }

    fn meta(id: &str, correlation: &str) -> MessageMeta {
        MessageMeta {
            message_id: id.into(),
            correlation_id: correlation.into(),
            timestamp: None,
        }
    }

    // --- Messages ---

    #[test]
    fn content_message() {
        // 08 01        chunk_id = 1
        // 12 02 aa bb  data
        let content = FileDataChunkContent {
            chunk_id: 1,
            data: vec![0xAA, 0xBB],
        };
        wire_test("content", &content, "08011202aabb");
    }

    #[test]
    fn message_meta_with_timestamp() {
        let value = MessageMeta {
            message_id: "m".into(),
            correlation_id: String::new(),
            timestamp: Some(prost_types::Timestamp {
                seconds: 1,
                nanos: 0,
            }),
        };
        wire_test("message_meta", &value, "0a016d1a020801");
    }

    #[test]
    fn content_frame() {
        // 0a 06 [0a 01 'm' 12 01 'c']  meta
        // 1a 06 [08 01 12 02 aa bb]    content (oneof tag 3)
        let frame = FileDataChunk::content(meta("m", "c"), 1, vec![0xAA, 0xBB]);
        wire_test("content_frame", &frame, "0a060a016d1201631a0608011202aabb");
    }

    #[test]
    fn first_content_frame_omits_chunk_id() {
        // chunk_id 0 is the proto3 default and is not written.
        let frame = FileDataChunk {
            meta: None,
            chunk: Some(file_data_chunk::Chunk::Content(FileDataChunkContent {
                chunk_id: 0,
                data: vec![0x01],
            })),
        };
        wire_test("first_content_frame", &frame, "1a03120101");
    }

    #[test]
    fn header_frame() {
        // 12 0d                        header (oneof tag 2)
        //   0a 06 [0a 01 'a' 28 fc 11] file_meta: name, size = 2300
        //   10 02                      chunks = 2
        //   18 dc 0b                   chunk_size = 1500
        let header = FileDataChunkHeader {
            file_meta: Some(FileMeta {
                name: "a".into(),
                size: 2300,
                ..Default::default()
            }),
            chunks: 2,
            chunk_size: 1500,
        };
        let frame = FileDataChunk {
            meta: None,
            chunk: Some(file_data_chunk::Chunk::Header(header)),
        };
        wire_test("header_frame", &frame, "120d0a060a016128fc11100218dc0b");
    }

    #[test]
    fn file_meta_all_fields() {
        // 0a 01 'f'           name
        // 12 01 'h'           hash
        // 1a 02 [08 05]       modified_time.seconds = 5
        // 22 04 "0644"        permissions
        // 28 03               size = 3
        let value = FileMeta {
            name: "f".into(),
            hash: "h".into(),
            modified_time: Some(prost_types::Timestamp {
                seconds: 5,
                nanos: 0,
            }),
            permissions: "0644".into(),
            size: 3,
        };
        wire_test("file_meta", &value, "0a01661201681a0208052204303634342803");
    }

    #[test]
    fn empty_frame_has_no_chunk() {
        let decoded = FileDataChunk::decode(&[][..]).unwrap();
        assert!(decoded.meta.is_none());
        assert!(decoded.chunk.is_none());
    }

    #[test]
    fn unknown_fields_are_skipped() {
        // content fixture followed by field 15 (varint) = 1.
        let bytes = hex::decode("08011202aabb7801").unwrap();
        let decoded = FileDataChunkContent::decode(bytes.as_slice()).unwrap();
        assert_eq!(decoded.chunk_id, 1);
        assert_eq!(decoded.data, vec![0xAA, 0xBB]);
    }

    // --- Framing ---

    #[tokio::test]
    async fn framed_content_frame_has_length_prefix() {
        use dataplane_transfer::{ChunkSink, FramedSink};

        let mut sink = FramedSink::new(Vec::new());
        sink.send(FileDataChunk::content(meta("m", "c"), 1, vec![0xAA, 0xBB]))
            .await
            .unwrap();

        assert_eq!(
            hex::encode(sink.into_inner()),
            "000000100a060a016d1201631a0608011202aabb"
        );
    }
}
