//! Prompt construction
//!
//! Builds the cinematic generation prompt from structured scene and
//! character inputs.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Where the soundtrack comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioMode {
    /// A pre-recorded track is supplied and must be lip-synced
    Upload,
    /// The model generates voice and soundscape itself
    Generate,
}

/// Character voice and demeanor presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CharacterVoice {
    Default,
    StandardMale,
    StandardFemale,
    Enthusiastic,
    Calm,
}

impl CharacterVoice {
    /// Performance instruction for this demeanor
    fn demeanor_instruction(&self) -> String {
        match self {
            CharacterVoice::Default => {
                "The character should deliver their lines with a natural and convincing \
                 expression."
                    .to_string()
            }
            CharacterVoice::Enthusiastic => {
                "The character is **enthusiastic**. Their performance should be energetic and \
                 highly expressive, with bright eyes, smiles, and dynamic gestures that match \
                 their excited tone."
                    .to_string()
            }
            CharacterVoice::Calm => {
                "The character is **calm and composed**. Their performance should be subtle and \
                 thoughtful, with gentle expressions, controlled movements, and a serene \
                 demeanor."
                    .to_string()
            }
            CharacterVoice::StandardMale | CharacterVoice::StandardFemale => {
                let gender = match self {
                    CharacterVoice::StandardMale => "male",
                    _ => "female",
                };
                format!(
                    "The character has a **standard {} voice**. Their performance should be \
                     clear, direct, and believable, with natural expressions suitable for \
                     conversation.",
                    gender
                )
            }
        }
    }

    /// Label used inside generated-audio instructions
    fn label(&self) -> &'static str {
        match self {
            CharacterVoice::Default => "Default",
            CharacterVoice::StandardMale => "Standard Male",
            CharacterVoice::StandardFemale => "Standard Female",
            CharacterVoice::Enthusiastic => "Enthusiastic",
            CharacterVoice::Calm => "Calm",
        }
    }
}

/// Structured inputs for the generation prompt
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptSpec {
    /// Scene description
    pub scene: String,
    /// Optional character appearance description
    pub character_description: Option<String>,
    /// Voice and demeanor preset
    pub voice: CharacterVoice,
    /// Optional dialogue or action line
    pub dialogue: Option<String>,
    /// Target video duration in seconds
    pub duration_secs: u32,
    /// Soundtrack mode
    pub audio: AudioMode,
}

impl PromptSpec {
    pub fn new(scene: impl Into<String>) -> Self {
        Self {
            scene: scene.into(),
            character_description: None,
            voice: CharacterVoice::Default,
            dialogue: None,
            duration_secs: 10,
            audio: AudioMode::Upload,
        }
    }
}

/// Build the full generation prompt
pub fn build_prompt(spec: &PromptSpec) -> String {
    let mut prompt = format!(
        "You are a world-class AI filmmaker and sound designer. Your task is to generate a \
         single, continuous, photorealistic video of exactly {duration} seconds in duration, \
         complete with fully synchronized audio.\n\n\
         **Cinematography & Realism:**\n\
         - **Duration:** The final video MUST be exactly {duration} seconds long.\n\
         - **Visual Style:** The video must be cinematic, with professional-grade lighting that \
         creates depth and mood. Use a shallow depth of field to keep the focus on the \
         character.\n\
         - **Realism:** Render all elements with photorealistic detail. Pay extreme attention \
         to realistic textures, reflections, shadows, and subtle environmental animations \
         (e.g., wind in hair, dust motes in light).\n\n\
         **Scene & Mood:**\n\
         - The setting is: \"{scene}\". Establish a cinematic atmosphere that complements this \
         scene.\n\n\
         **Character Focus:**",
        duration = spec.duration_secs,
        scene = spec.scene,
    );

    if let Some(description) = &spec.character_description {
        prompt.push_str(&format!(
            "\n- **Appearance:** The character is described as: \"{}\". Render them with \
             ultra-realistic skin textures, hair that moves naturally, and detailed clothing.",
            description
        ));
    }

    prompt.push_str(&format!(
        "\n- **Personality & Demeanor:** {}\n\
         - **Non-Verbal Communication:** This is critical for realism. Enhance the performance \
         with natural, non-verbal cues. Include subtle eye movements (saccades, blinks), head \
         tilts, micro-expressions, and gestures that align with the dialogue's emotional \
         content and the character's demeanor.",
        spec.voice.demeanor_instruction()
    ));

    if let Some(dialogue) = &spec.dialogue {
        prompt.push_str(&format!(
            "\n\n**Performance & Dialogue:**\n\
             - **Action:** The character will perform and speak the following dialogue: \"{}\".",
            dialogue
        ));
    }

    match spec.audio {
        AudioMode::Upload => {
            prompt.push_str(
                "\n- **CRITICAL: Flawless Lip-Sync:** You are provided with a pre-recorded \
                 audio track. The character's mouth movements **must** be perfectly and \
                 flawlessly synchronized to this provided audio. This is the most important \
                 requirement. Analyze the audio's phonemes and timing to create a 100% \
                 accurate and believable lip-sync.",
            );
        }
        AudioMode::Generate => {
            prompt.push_str(
                "\n- **CRITICAL: Generated Audio & Lip-Sync:** You must generate the audio for \
                 this scene.",
            );
            prompt.push_str(&format!(
                "\n    - **Voice:** The character's voice should match the '{}' style.",
                spec.voice.label()
            ));
            prompt.push_str(&format!(
                "\n    - **Dialogue:** If dialogue is provided (\"{}\"), the character must \
                 speak it. The delivery must match their described demeanor.",
                spec.dialogue.as_deref().unwrap_or("")
            ));
            prompt.push_str(&format!(
                "\n    - **Soundscape:** Generate a rich, immersive soundscape that matches \
                 the scene (\"{}\"). Include ambient sounds, and subtle foley effects.",
                spec.scene
            ));
            prompt.push_str(
                "\n    - **Synchronization:** The generated dialogue must be perfectly \
                 lip-synced to the character's mouth movements.",
            );
        }
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_includes_duration_and_scene() {
        let mut spec = PromptSpec::new("a rainy neon alley");
        spec.duration_secs = 30;
        let prompt = build_prompt(&spec);

        assert!(prompt.contains("exactly 30 seconds"));
        assert!(prompt.contains("The setting is: \"a rainy neon alley\""));
    }

    #[test]
    fn test_uploaded_audio_gets_lip_sync_clause() {
        let spec = PromptSpec::new("a quiet library");
        let prompt = build_prompt(&spec);

        assert!(prompt.contains("Flawless Lip-Sync"));
        assert!(!prompt.contains("Generated Audio & Lip-Sync"));
    }

    #[test]
    fn test_generated_audio_gets_soundscape_clause() {
        let mut spec = PromptSpec::new("a quiet library");
        spec.audio = AudioMode::Generate;
        spec.voice = CharacterVoice::Calm;
        let prompt = build_prompt(&spec);

        assert!(prompt.contains("Generated Audio & Lip-Sync"));
        assert!(prompt.contains("'Calm' style"));
        assert!(!prompt.contains("Flawless Lip-Sync"));
    }

    #[test]
    fn test_character_section_is_optional() {
        let mut spec = PromptSpec::new("a rooftop at dawn");
        assert!(!build_prompt(&spec).contains("**Appearance:**"));

        spec.character_description = Some("a grizzled detective".to_string());
        let prompt = build_prompt(&spec);
        assert!(prompt.contains("**Appearance:**"));
        assert!(prompt.contains("a grizzled detective"));
    }

    #[test]
    fn test_dialogue_section_is_optional() {
        let mut spec = PromptSpec::new("a rooftop at dawn");
        assert!(!build_prompt(&spec).contains("**Performance & Dialogue:**"));

        spec.dialogue = Some("This city never sleeps.".to_string());
        let prompt = build_prompt(&spec);
        assert!(prompt.contains("**Performance & Dialogue:**"));
        assert!(prompt.contains("This city never sleeps."));
    }

    #[test]
    fn test_demeanor_matches_voice() {
        let mut spec = PromptSpec::new("scene");
        spec.voice = CharacterVoice::Enthusiastic;
        assert!(build_prompt(&spec).contains("**enthusiastic**"));

        spec.voice = CharacterVoice::StandardFemale;
        assert!(build_prompt(&spec).contains("standard female voice"));

        spec.voice = CharacterVoice::Calm;
        assert!(build_prompt(&spec).contains("**calm and composed**"));
    }
}
