//! Prompt construction for hook and song generation.
//!
//! Everything here is pure: randomness for hook prompts comes from the
//! caller through [`HookIngredients::draw`].

use super::models::GenerationRequest;
use super::style::{StyleBand, StyleLevel};
use rand::Rng;

pub const TIMES_OF_DAY: [&str; 6] = [
    "dawn",
    "morning",
    "afternoon",
    "sunset",
    "midnight",
    "late night",
];

pub const EMOTIONS: [&str; 10] = [
    "hopeful",
    "regretful",
    "defiant",
    "nostalgic",
    "celebratory",
    "melancholic",
    "yearning",
    "content",
    "restless",
    "grateful",
];

pub const SETTINGS: [&str; 10] = [
    "holler",
    "creek",
    "porch",
    "truck bed",
    "dive bar",
    "church parking lot",
    "county fair",
    "gravel road",
    "kitchen table",
    "front yard",
];

/// Exclusive upper bound of the seed embedded in hook prompts.
pub const SEED_RANGE: u32 = 10_000;

/// The random choices interpolated into a hook prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookIngredients {
    pub seed: u32,
    pub time_of_day: &'static str,
    pub emotion: &'static str,
    pub setting: &'static str,
}

impl HookIngredients {
    pub fn draw<R: Rng>(rng: &mut R) -> Self {
        Self {
            seed: rng.random_range(0..SEED_RANGE),
            time_of_day: TIMES_OF_DAY[rng.random_range(0..TIMES_OF_DAY.len())],
            emotion: EMOTIONS[rng.random_range(0..EMOTIONS.len())],
            setting: SETTINGS[rng.random_range(0..SETTINGS.len())],
        }
    }
}

/// Builds the prompt asking for a single hook phrase.
pub fn hook_prompt(level: StyleLevel, ingredients: &HookIngredients) -> String {
    let HookIngredients {
        seed,
        time_of_day,
        emotion,
        setting,
    } = ingredients;

    match level.band() {
        StyleBand::RadioHit => format!(
            r#"You are helping Alex Wilson create a CHART-TOPPING country hook. Look at what actually succeeds on country radio.

Random seed: {seed}
Time: {time_of_day}
Mood: {emotion}

STUDY THESE ACTUAL #1 COUNTRY HITS:
- "Cruise" - simple action, feelgood
- "Body Like a Back Road" - catchy comparison
- "Dirt Road Anthem" - place + attitude
- "Chicken Fried" - food = comfort
- "Red Solo Cup" - specific object for partying
- "She Thinks My Tractor's Sexy" - funny, memorable
- "Wagon Wheel" - place name that's singable
- "Achy Breaky Heart" - simple feeling
- "Friends in Low Places" - relatable situation

WHAT WORKS:
- SHORT (3-5 words max)
- CONCRETE objects/actions (not abstract concepts)
- SINGABLE and REPEATABLE
- Makes you FEEL GOOD or RELATE instantly
- Often about: trucks, beer, love, heartbreak, small towns, Friday nights

DO NOT CREATE:
- Abstract metaphors like "Coffee Cup Cathedral"
- Wordy concepts like "Sunday School Parking Brake"
- Philosophy like "Muddy Water Optimist"
- Anything that needs explanation

CREATE A HOOK LIKE:
- "Backroad Baptism" - getting wild on dirt roads
- "Truck Bed Sunrise" - romantic moment
- "Whiskey Weather" - drinking mood
- "Barefoot Blue Jean Night" - summer fun
- "Pontoon" - one word, instant image
- "Dirt on My Boots" - simple, visual
- "Beer Never Broke My Heart" - funny truth

Your hook should be:
- {emotion} mood
- Set in/around: {setting}
- Something you'd hear on the radio
- Instantly memorable
- Makes people want to turn it up

Give me ONLY the hook (3-5 words). Make it a potential #1 hit, not poetry."#
        ),
        StyleBand::Balanced => format!(
            r#"You are helping Alex Wilson create a country hook that balances commercial appeal with storytelling depth.

Random seed: {seed}
Time: {time_of_day}
Mood: {emotion}
Setting: {setting}

BALANCED HITS TO STUDY:
- "Amarillo By Morning" - place with emotion
- "Friends in Low Places" - relatable story, great hook
- "The Dance" - metaphor that's accessible
- "Strawberry Wine" - nostalgic storytelling
- "Something to Be Proud Of" - meaningful but singable
- "Live Like You Were Dying" - deep message, catchy

CREATE A HOOK THAT:
- Has commercial appeal AND meaning
- 3-6 words (can be slightly longer than pure radio)
- Tells a story people connect with
- Still singable and memorable
- Can work on radio but has depth

AVOID:
- Overly complex metaphors
- Pure clichés without twist
- Anything too abstract

Your hook should capture the {emotion} mood at {time_of_day} near the {setting}.

Give me ONLY the hook."#
        ),
        StyleBand::Artistic => format!(
            r#"You are helping Alex Wilson create an artistic country hook that prioritizes storytelling and emotional depth over pure commercial appeal.

Random seed: {seed}
Time: {time_of_day}
Mood: {emotion}
Setting: {setting}

ARTISTIC COUNTRY MASTERPIECES:
- "He Stopped Loving Her Today" - story-driven classic
- "The Grand Tour" - extended metaphor
- "Coat of Many Colors" - personal narrative
- "Sunday Morning Coming Down" - atmospheric poetry
- "Pancho and Lefty" - character-driven
- "Coffee Cup Cathedral" - unexpected metaphor
- "Digital Bonfire" - modern meets traditional

CREATE A HOOK THAT:
- Prioritizes artistic expression
- Can be longer (4-8 words)
- Uses unexpected metaphors or imagery
- Tells a deeper story
- May challenge listeners but rewards them
- Has layers of meaning

EMBRACE:
- Complex emotions
- Unusual word combinations
- Poetic language
- Character-driven narratives
- Social commentary

Your hook should evoke {emotion} at {time_of_day} near the {setting}, but with artistic depth.

Give me ONLY the hook. Make it thought-provoking and memorable."#
        ),
    }
}

fn style_instructions(level: StyleLevel) -> String {
    match level.band() {
        StyleBand::RadioHit => format!(
            r#"STYLE LEVEL: RADIO HIT ({level}/100)

FOCUS ON:
- MAXIMUM HOOK APPEAL - think "Cruise," "Red Solo Cup," "Chicken Fried"
- Simple, catchy, repeatable phrases
- Verses that set up the hook, not complex narratives
- Every line should be singable by drunk people at 2am
- Feel-good or relatable emotions only
- NO abstract metaphors, NO complex wordplay
- Structure: Simple Verse-Chorus-Verse-Chorus-Bridge-Chorus
- Keep it under 3 minutes mentally"#
        ),
        StyleBand::Balanced => format!(
            r#"STYLE LEVEL: BALANCED ({level}/100)

FOCUS ON:
- Strong hooks WITH meaningful stories
- Think "Friends in Low Places," "The Dance," "Amarillo By Morning"
- Clever wordplay that doesn't sacrifice accessibility
- Verses tell a story, chorus delivers the payoff
- Mix concrete imagery with emotional depth
- Can have ONE clever metaphor if it serves the hook
- Structure can include pre-chorus if it helps the story"#
        ),
        StyleBand::Artistic => format!(
            r#"STYLE LEVEL: ARTISTIC/STORY-DRIVEN ({level}/100)

FOCUS ON:
- STORYTELLING FIRST - think "He Stopped Loving Her Today," "The Grand Tour"
- Complex narratives and character development welcome
- Metaphors like "Coffee Cup Cathedral" or "Digital Bonfire" encouraged
- Verses can be longer, more detailed
- Hook can be thought-provoking rather than instantly catchy
- Embrace unconventional structures if they serve the story
- Literary devices, symbolism, and layers of meaning welcome"#
        ),
    }
}

const PERSONA: &str = r#"You are writing a country song as Alex Wilson, a singer-songwriter from Pike County, Kentucky. Born July 12, 2005 in Pikeville, Alex has a deep, gravel-warm voice like Johnny Cash or Chris Stapleton. He learned music to cope with an abusive childhood and his ethos is "work hard, tell the truth, never become my father.""#;

const SONGWRITING_STYLE: &str = r#"ALEX WILSON'S SONGWRITING STYLE:

1. STORYTELLING FIRST:
- Start with authentic, honest storytelling rooted in real experiences
- Use CONCRETE IMAGERY: rust on fenders, dime-store rings, creaky porches, dusty boots
- Draw from Appalachian settings: mountains, hollers, creeks, small towns
- Even fictional stories should feel lived-in with sensory details

2. THE HOOK IS EVERYTHING:
- The hook must be SHORT, CATCHY, and RADIO-READY
- Think "Cruise," "Pontoon," "Dirt Road Anthem" - not poetry
- Should make people want to turn it up and sing along
- Examples from Alex's hits:
  * "Biscuits & Regret" - simple, relatable
  * "Truck Bed Sunrise" - visual, romantic
  * "Boots Off" - action that means something
  * "Barefoot Friday Night" - instant good feeling

3. LANGUAGE & TONE:
- Plain, conversational English - Alex's rural Kentucky voice
- Natural rhymes (AABB or ABAB) that don't feel forced
- Colloquialisms okay ("ain't," "holler," "gonna") but not caricature
- Vulnerability and raw emotion connect with listeners

4. STRUCTURE:
- Verse-Chorus with optional Pre-Chorus and Bridge
- Strong opening line hooks the listener
- Verses tell story with concrete details
- Chorus delivers the hook memorably
- Bridge provides contrast or new perspective
- Keep it 3-4 minutes

5. INSTRUMENTATION BY SUB-GENRE:
- Bluegrass: Acoustic guitar, banjo, fiddle, upright bass, mandolin
- Honky-Tonk: Piano, pedal steel, twangy electric guitar
- Outlaw/Americana: Raw acoustic guitar, harmonica, minimal production
- Country Pop: Acoustic/electric guitars, banjo fills, polished drums
- Modern/Crossover: Can include drum machines, synth pads, 808 bass

6. ALEX'S THEMES:
- Love & relationships (devoted, uncertain, or rebellious)
- Heartbreak & regret (hangovers, lost love, bad choices)
- Rural life (working land, fixing trucks, county fairs)
- Bar culture (dive bars, honky-tonks, late nights)
- Ambition & fame (Nashville dreams vs small-town roots)
- Travel & displacement (leaving home, city vs country)
- Humor & whimsy (clever narratives with wordplay)
- Technology vs tradition (social media meets rural life)
- Faith & spirituality (finding church outside church walls)"#;

const RESPONSE_FORMAT: &str = r#"You MUST respond with ONLY a valid JSON object in this exact format:
{
  "title": "[The Hook Phrase - Alex Wilson style]",
  "lyrics": "[Complete lyrics with clear verse/chorus markers. Use Alex's conversational tone and concrete imagery]",
  "sunoStyle": "[One paragraph describing tempo, key, instrumentation for Alex's style - mention specific instruments like acoustic guitar, fiddle, pedal steel, etc. Match the sub-genre]",
  "notes": "[Explain the HOOK and why it works for Alex Wilson, how it connects to his themes, intended audience, and key musical elements]"
}

DO NOT include any text before or after the JSON object. Remember: Alex writes RADIO HITS with heart. The hook should be something drunk people can sing at 2am. Think "Friends in Low Places" not "The Sound and the Fury.""#;

/// Builds the prompt asking for a complete song as a JSON object.
pub fn song_prompt(request: &GenerationRequest) -> String {
    let mut prompt = String::with_capacity(6 * 1024);
    prompt.push_str(PERSONA);
    prompt.push_str("\n\n");
    prompt.push_str(&format!("Theme/Concept: {}\n", request.theme.trim()));

    let optional_fields = [
        ("Sub-genre", &request.subgenre),
        ("Vocal Style", &request.vocal_style),
        ("Mood", &request.mood),
        ("Additional Notes", &request.additional_notes),
    ];
    for (label, value) in optional_fields {
        if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            prompt.push_str(&format!("{}: {}\n", label, value));
        }
    }

    prompt.push('\n');
    prompt.push_str(&style_instructions(request.style_level));
    prompt.push_str("\n\n");
    prompt.push_str(SONGWRITING_STYLE);
    prompt.push_str("\n\n");
    prompt.push_str(RESPONSE_FORMAT);
    prompt
}
