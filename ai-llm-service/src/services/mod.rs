pub mod gemini_service;
