//! End-to-end pipeline scenarios: upload batch to answer

#[cfg(test)]
mod pipeline_tests {
    use std::sync::Arc;

    use chrono::Utc;

    use crate::documents::extractor::tests::pdf_with_pages;
    use crate::documents::UploadedFile;
    use crate::llm::prompts::ANSWER_INSTRUCTION;
    use crate::rag::GeneratorMode;
    use crate::session::ChatHistory;
    use crate::tests::fakes::rag_service_with;
    use crate::tests::fakes::text_file;
    use crate::tests::fakes::FailingEmbedder;
    use crate::tests::fakes::KeywordEmbedder;
    use crate::tests::fakes::RecordingChatModel;
    use crate::DocChatError;

    #[tokio::test]
    async fn test_single_page_pdf_reaches_generator() {
        let model = Arc::new(RecordingChatModel::replying("The sky is blue."));
        let service = rag_service_with(
            Arc::new(KeywordEmbedder::default()),
            model.clone(),
            GeneratorMode::Stateless,
        );
        let pdf = UploadedFile::new(
            "sky.pdf",
            Some("application/pdf"),
            pdf_with_pages(&["The sky is blue."]),
        );

        let (chain, report) = service.index_documents(vec![pdf]).await.unwrap();
        assert_eq!(report.passages, 1);
        assert_eq!(chain.index().len(), 1);

        let response = service
            .query(&chain, "What color is the sky?", &[])
            .await
            .unwrap();

        assert_eq!(response.answer, "The sky is blue.");
        assert_eq!(response.sources.len(), 1);
        assert!(response.sources[0].text.contains("The sky is blue."));

        let prompts = model.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Context: The sky is blue."));
        assert!(prompts[0].contains("Question: What color is the sky?"));
    }

    #[tokio::test]
    async fn test_unanswerable_question_sends_dont_know_instruction() {
        let model = Arc::new(RecordingChatModel::replying("I don't know."));
        let service = rag_service_with(
            Arc::new(KeywordEmbedder::default()),
            model.clone(),
            GeneratorMode::Stateless,
        );
        let (chain, _) = service
            .index_documents(vec![text_file("sky.txt", "The sky is blue.")])
            .await
            .unwrap();

        let response = service
            .query(&chain, "What is the capital of France?", &[])
            .await
            .unwrap();

        assert_eq!(response.answer, "I don't know.");
        assert!(model.prompts()[0].starts_with(ANSWER_INSTRUCTION));
    }

    #[tokio::test]
    async fn test_retrieval_caps_at_top_k() {
        let service = rag_service_with(
            Arc::new(KeywordEmbedder::default()),
            Arc::new(RecordingChatModel::replying("ok")),
            GeneratorMode::Stateless,
        );
        // Long enough to span many passages
        let text = (0..200)
            .map(|i| format!("Passage {i} talks about rivers and the sea at length."))
            .collect::<Vec<_>>()
            .join("\n\n");

        let (chain, report) = service
            .index_documents(vec![text_file("long.txt", &text)])
            .await
            .unwrap();
        assert!(report.passages > 4);

        let response = service.query(&chain, "rivers", &[]).await.unwrap();
        assert_eq!(response.sources.len(), 4);
        assert!(response
            .sources
            .windows(2)
            .all(|w| w[0].score >= w[1].score));
    }

    #[tokio::test]
    async fn test_whitespace_only_upload_is_empty_document() {
        let service = rag_service_with(
            Arc::new(KeywordEmbedder::default()),
            Arc::new(RecordingChatModel::replying("ok")),
            GeneratorMode::Stateless,
        );

        let result = service
            .index_documents(vec![text_file("blank.txt", "  \n\n \t ")])
            .await;
        assert!(matches!(result, Err(DocChatError::EmptyDocument)));
    }

    #[tokio::test]
    async fn test_failed_file_does_not_abort_batch() {
        let service = rag_service_with(
            Arc::new(KeywordEmbedder::default()),
            Arc::new(RecordingChatModel::replying("ok")),
            GeneratorMode::Stateless,
        );
        let broken = UploadedFile::new("broken.txt", Some("text/plain"), vec![0xff, 0xfe, 0x00]);

        let (_, report) = service
            .index_documents(vec![broken, text_file("sky.txt", "The sky is blue.")])
            .await
            .unwrap();

        assert_eq!(report.files.len(), 2);
        assert!(report.files[0].error.is_some());
        assert!(report.files[1].error.is_none());
        assert_eq!(report.passages, 1);
    }

    #[tokio::test]
    async fn test_all_files_failing_is_empty_document() {
        let service = rag_service_with(
            Arc::new(KeywordEmbedder::default()),
            Arc::new(RecordingChatModel::replying("ok")),
            GeneratorMode::Stateless,
        );
        let image = UploadedFile::new("photo.png", Some("image/png"), vec![0x89, 0x50]);

        let result = service.index_documents(vec![image]).await;
        assert!(matches!(result, Err(DocChatError::EmptyDocument)));
    }

    #[tokio::test]
    async fn test_embedding_failure_fails_build() {
        let service = rag_service_with(
            Arc::new(FailingEmbedder::always()),
            Arc::new(RecordingChatModel::replying("ok")),
            GeneratorMode::Stateless,
        );

        let result = service
            .index_documents(vec![text_file("sky.txt", "The sky is blue.")])
            .await;
        assert!(matches!(result, Err(DocChatError::EmbeddingService(_))));
    }

    #[tokio::test]
    async fn test_blank_question_rejected() {
        let model = Arc::new(RecordingChatModel::replying("ok"));
        let service = rag_service_with(
            Arc::new(KeywordEmbedder::default()),
            model.clone(),
            GeneratorMode::Stateless,
        );
        let (chain, _) = service
            .index_documents(vec![text_file("sky.txt", "The sky is blue.")])
            .await
            .unwrap();

        let result = service.query(&chain, "   ", &[]).await;
        assert!(matches!(result, Err(DocChatError::EmptyQuestion)));
        assert!(model.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_condensed_question_drives_retrieval() {
        let model = Arc::new(RecordingChatModel::scripted(
            &["What color is the sky?"],
            "Blue.",
        ));
        let service = rag_service_with(
            Arc::new(KeywordEmbedder::default()),
            model.clone(),
            GeneratorMode::Condensing,
        );
        let (chain, _) = service
            .index_documents(vec![
                text_file("grass.txt", "Grass grows green in spring."),
                text_file("sky.txt", "The sky is blue."),
            ])
            .await
            .unwrap();

        let mut history = ChatHistory::default();
        history.push_exchange(Utc::now(), "Tell me about the sky.", "It is above us.");

        let response = service
            .query(&chain, "And its color?", history.turns())
            .await
            .unwrap();

        assert_eq!(response.question, "And its color?");
        assert_eq!(
            response.standalone_question.as_deref(),
            Some("What color is the sky?")
        );
        assert!(response.sources[0].text.contains("The sky is blue."));

        let prompts = model.prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[1].contains("Question: What color is the sky?"));
    }
}
