//! ChatML rendering shared by training and evaluation.

use crate::dataset::TrainingExample;

const IM_START: &str = "<|im_start|>";
const IM_END: &str = "<|im_end|>";

fn turn(role: &str, content: &str) -> String {
    format!("{IM_START}{role}\n{content}{IM_END}")
}

/// Full training text: system, user and closed assistant turn.
pub fn render_example(example: &TrainingExample) -> String {
    format!(
        "{}\n{}\n{}",
        turn("system", &example.instruction),
        turn("user", &example.input),
        turn("assistant", &example.output)
    )
}

/// Generation prompt: system and user turns, assistant turn left open.
pub fn render_prompt(system: &str, user: &str) -> String {
    format!(
        "{}\n{}\n{IM_START}assistant\n",
        turn("system", system),
        turn("user", user)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_training_text() {
        let example = TrainingExample::new("sys", "早安", "おはよ");
        assert_eq!(
            render_example(&example),
            "<|im_start|>system\nsys<|im_end|>\n\
             <|im_start|>user\n早安<|im_end|>\n\
             <|im_start|>assistant\nおはよ<|im_end|>"
        );
    }

    #[test]
    fn renders_open_prompt() {
        assert_eq!(
            render_prompt("sys", "Who are you?"),
            "<|im_start|>system\nsys<|im_end|>\n\
             <|im_start|>user\nWho are you?<|im_end|>\n\
             <|im_start|>assistant\n"
        );
    }

    #[test]
    fn multiline_system_prompt_is_kept_verbatim() {
        let rendered = render_prompt("line one\nline two", "q");
        assert!(rendered.starts_with("<|im_start|>system\nline one\nline two<|im_end|>"));
    }
}
