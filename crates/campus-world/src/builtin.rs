//! Built-in campus data set: four maps, their portals, and resident NPCs

use campus_core::{Aabb, ActionKind, Direction, Vec2};

use crate::atlas::{SpawnPoint, WorldAtlas};
use crate::error::WorldError;
use crate::map::{
    ItemKind, ItemPickup, MapDefinition, MapId, NpcArchetype, NpcSpawn, PitchLayout, Portal, Readable,
    TILE_SIZE,
};
use crate::tile::TileGrid;

/// Player start tile on the campus, just inside the main gate
pub const PLAYER_START_TILE: (u32, u32) = (16, 34);

const CAMPUS_ROWS: [&str; 40] = [
    "########################################",
    "..T.......MMMMM.......................T.",
    "..........MMMMM=========................",
    ".T........MMMMM=.......=..............T.",
    "..........MAAAM=.......=....CCCCC.......",
    "...........=====.......=....CCCCC.......",
    "...........=...=.......=....CCDCC.......",
    "...........=...=.......=......=.........",
    "...........=LLLLLLLL===========.........",
    "..aaaaa....=LllllllL=...~~~~~~~.......T.",
    "..aaaaa....=LllllllL=...~~~~~~~~........",
    "..aaDaa....=LLDLLLLL=...~~~~~~~~........",
    "....=......=..=.....=...~~~~~~~.........",
    ".T..==============================...T..",
    "........HHHHH.................YYYYY.....",
    "........HHHHH.................YYYYY.....",
    "........HHDHH=================YYDYY.....",
    "..........=..=++++++++++=.......=.......",
    ".T........=..=++++++++++=.......=....T..",
    "..........=..=++++++++++=.......=.......",
    "..........====++++++++++=========.......",
    "......rrrrrrrrrrrrrrrrrr.....JJJJJ......",
    "......rffffffffffffffffr.....JJJJJ......",
    ".T....rffffffffffffffffr.....JJDJJ....T.",
    "......rffffffffffffffffr.......=........",
    "......rffffffffffffffffr.......=........",
    "......rffffffffffffffffr.......=........",
    "......rrrrrrrrrrrrrrrrrr.......=........",
    "..........=....................=........",
    ".T........======================......T.",
    "....wwNNNNNNNww=...=....................",
    "....wwNNNNNNNww=...=....................",
    "....wwcccDcccww=...=....................",
    ".........=.....=...=....................",
    ".......=============....................",
    "############InnnnnnI####################",
    "............I::::::I....................",
    "............I::::::I....................",
    ".............======.....................",
    ".............======.....................",
];

const TUNNEL_ROWS: [&str; 29] = [
    "%%%%%%%eeeeee%%%%%%%",
    "%%%%%%%______%%%%%%%",
    "%%%%%%%______%%%%%%%",
    "%%%%%%________%%%%%%",
    "%%%%%%__*__*__%%%%%%",
    "%%%%%%________%%%%%%",
    "%%%%%%________%%%%%%",
    "%%%%%%________%%%%%%",
    "%%%%%%__*__*__%%%%%%",
    "%%%%%%________%%%%%%",
    "%%%%%%________%%%%%%",
    "%%%%%%________%%%%%%",
    "%%%%%%__*__*__%%%%%%",
    "%%%%%%________%%%%%%",
    "%%%%%%________%%%%%%",
    "%%%%%%________%%%%%%",
    "%%%%%%__*__*__%%%%%%",
    "%%%%%%________%%%%%%",
    "%%%%%%________%%%%%%",
    "%%%%%%________%%%%%%",
    "%%%%%%__*__*__%%%%%%",
    "%%%%%%________%%%%%%",
    "%%%%%%________%%%%%%",
    "%%%%%%________%%%%%%",
    "%%%%%%__*__*__%%%%%%",
    "%%%%%%________%%%%%%",
    "%%%%%%_zzzzzz_%%%%%%",
    "%%%%%%_zzzzzz_%%%%%%",
    "%%%%%%%xxxxxx%%%%%%%",
];

const LIBRARY_ROWS: [&str; 12] = [
    "XXXXXXXXXXXXXXXX",
    "XSS_________SSSX",
    "XSS_________SSSX",
    "X______________X",
    "X______________X",
    "XSS_________SSSX",
    "XSS_________SSSX",
    "X______________X",
    "XSS_________SSSX",
    "X____KKKK______X",
    "X______D_______X",
    "XXXXXXXDXXXXXXXX",
];

const INTERIOR_ROWS: [&str; 16] = [
    "XXXXXXXXXXXXXXXX",
    "X______________X",
    "X______________X",
    "X______________X",
    "X__mmmmmmmmmm__X",
    "X__mmmmmmmmmm__X",
    "X__mmmmmmmmmm__X",
    "X__mmmmmmmmmm__X",
    "X__mmmmmmmmmm__X",
    "X__mmmmmmmmmm__X",
    "X__mmmmmmmmmm__X",
    "X__mmmmmmmmmm__X",
    "X______________X",
    "X______________X",
    "X______________X",
    "XXXXXXXDDXXXXXXX",
];

/// Library shelves by tile: shelf label and three of its books
const BOOKSHELVES: [((u32, u32), &str, [&str; 3]); 25] = [
    ((1, 1), "Japanese", ["The Tale of Genji", "Norwegian Wood", "Complete Japanese Grammar"]),
    ((2, 1), "Korean", ["Korean for Beginners", "A History of the Korean Peninsula", "Studies in Korean Culture"]),
    ((1, 2), "Arabic", ["One Thousand and One Nights", "Quranic Studies", "An Arabic Course"]),
    ((2, 2), "Thai", ["Thai Basics", "Cultures of Southeast Asia", "A History of Thailand"]),
    ((12, 1), "English", ["The Complete Works of Shakespeare", "Pride and Prejudice", "English Lexicology"]),
    ((13, 1), "French", ["Les Misérables", "The Little Prince", "French Grammar"]),
    ((14, 1), "German", ["Faust", "The Sorrows of Young Werther", "A German Course"]),
    ((12, 2), "Spanish", ["Don Quixote", "One Hundred Years of Solitude", "Spanish for Beginners"]),
    ((13, 2), "Russian", ["War and Peace", "Crime and Punishment", "Russian Grammar"]),
    ((14, 2), "Italian", ["The Divine Comedy", "The Decameron", "Italian Basics"]),
    ((1, 5), "Chinese Classics", ["Dream of the Red Chamber", "Romance of the Three Kingdoms", "The Book of Songs"]),
    ((2, 5), "Modern Chinese", ["Fortress Besieged", "To Live", "Ordinary World"]),
    ((1, 6), "Linguistics", ["An Introduction to Linguistics", "Saussure's Linguistics", "Contrastive Linguistics"]),
    ((2, 6), "Translation", ["Translation Theory and Practice", "Interpreting Skills", "Literary Translation Studies"]),
    ((12, 5), "Portuguese", ["Portuguese for Beginners", "Brazilian Culture", "Conversational Portuguese"]),
    ((13, 5), "Polish", ["A Polish Course", "Eastern European Literature", "A History of Poland"]),
    ((14, 5), "Greek", ["The Iliad", "Greek Mythology", "Modern Greek"]),
    ((12, 6), "Dutch", ["Dutch Basics", "Culture of the Low Countries", "Business Dutch"]),
    ((13, 6), "Swedish", ["Swedish for Beginners", "Nordic Literature", "Scandinavian Studies"]),
    ((14, 6), "Vietnamese", ["A Vietnamese Course", "A History of Vietnam", "Southeast Asian Politics"]),
    ((1, 8), "Diplomacy", ["An Introduction to Diplomacy", "International Relations", "Diplomatic Protocol"]),
    ((2, 8), "International Trade", ["International Trade in Practice", "Business English", "Cross-Cultural Communication"]),
    ((12, 8), "Journalism", ["An Introduction to Journalism", "International Communication", "Media English"]),
    ((13, 8), "Law", ["International Law", "Diplomatic Law", "Comparative Law"]),
    ((14, 8), "Economics", ["International Economics", "Development Economics", "Macroeconomics"]),
];

fn tile(col: u32, row: u32) -> Vec2 {
    Vec2::new(col as f32 * TILE_SIZE, row as f32 * TILE_SIZE)
}

/// A shelf can be read from any tile touching it
fn bookshelf(&((col, row), label, books): &((u32, u32), &str, [&str; 3])) -> Readable {
    let shelf = Aabb::at(tile(col, row), Vec2::splat(TILE_SIZE));
    Readable {
        reach: shelf.inset(-TILE_SIZE),
        title: format!("{} shelf", label),
        lines: books.iter().map(|b| b.to_string()).collect(),
    }
}

fn portal(
    trigger: Aabb,
    required_facing: Direction,
    target_map: MapId,
    target_spawn: Vec2,
    target_facing: Direction,
) -> Portal {
    Portal {
        trigger,
        required_facing,
        target_map,
        target_spawn,
        target_facing,
    }
}

fn resident(
    id: &str,
    name: &str,
    archetype: NpcArchetype,
    (col, row): (u32, u32),
    facing: Direction,
    lines: &[&str],
    persona: &str,
) -> NpcSpawn {
    NpcSpawn {
        id: id.to_string(),
        name: name.to_string(),
        archetype,
        position: tile(col, row),
        facing,
        dialogue_lines: lines.iter().map(|l| l.to_string()).collect(),
        persona: Some(persona.to_string()),
        capabilities: Vec::new(),
    }
}

fn campus_npcs() -> Vec<NpcSpawn> {
    use Direction::*;
    use NpcArchetype::*;

    let mut professor_wang = resident(
        "professor_1",
        "Professor Wang",
        Professor,
        (24, 28),
        Left,
        &["Hello, student.", "The Main Building is the landmark of our university."],
        "A senior professor who has taught here for decades. Patient, a little old-fashioned, secretly loves football.",
    );
    professor_wang.capabilities.push(ActionKind::Exercise);

    let mut teacher_li = resident(
        "professor_2",
        "Teacher Li",
        Professor,
        (11, 17),
        Right,
        &["Welcome to campus!", "The little plaza often hosts events."],
        "A teacher in the Arabic department. Energetic and always keen to recruit students to a kickabout.",
    );
    teacher_li.capabilities.push(ActionKind::Exercise);

    vec![
        resident(
            "student_1",
            "Xiao Ming",
            Student,
            (18, 18),
            Down,
            &["Hi! Welcome to campus!", "The library is the big building to the north."],
            "An English-department student. Cheerful, drops English phrases into conversation.",
        ),
        resident(
            "student_2",
            "Xiao Hong",
            StudentFemale,
            (14, 22),
            Right,
            &["Hello there!", "The sports field is huge, great for football."],
            "A French-department student. Chatty and a little mischievous.",
        ),
        resident(
            "student_3",
            "Xiao Li",
            Student,
            (21, 12),
            Left,
            &["I just came out of the library.", "They have every book you can think of!"],
            "A Japanese-department student. Bookish and tired from studying.",
        ),
        professor_wang,
        teacher_li,
        resident(
            "canteen_staff",
            "Auntie Zhang",
            Staff,
            (27, 6),
            Right,
            &["Have you eaten yet?", "Braised pork on the menu today!"],
            "Works in the canteen. Warm, motherly, worries that students skip meals.",
        ),
        resident(
            "student_japan",
            "Tanaka",
            Student,
            (28, 23),
            Right,
            &["Hi! I'm an exchange student from Japan.", "The Japan Center is where I have class."],
            "An exchange student from Japan, in the second semester. Polite and still learning Chinese.",
        ),
        resident("cat_orange_1", "Big Orange", CatOrange, (20, 19), Down, &["Meow~"], "The plump orange cat that rules the little plaza."),
        resident("cat_orange_2", "Tangerine", CatOrange, (21, 8), Down, &["Meow meow meow~"], "A lively orange cat that never sits still."),
        resident("cat_calico", "Huahua", CatCalico, (23, 9), Down, &["Meow?"], "A calico cat by the pond who loves watching the koi."),
        resident("cat_black", "Shadow", CatBlack, (5, 12), Down, &["Meow..."], "A wary black cat that lives near the admin building."),
        resident("cat_calico_2", "Patches", CatCalico, (25, 25), Down, &["Meow~"], "A calico cat that sunbathes beside the Japan Center."),
        resident("cat_orange_3", "Chubby", CatOrange, (16, 37), Down, &["Meow meow!"], "The orange cat that greets everyone at the main gate."),
    ]
}

fn campus() -> Result<MapDefinition, WorldError> {
    Ok(MapDefinition {
        id: MapId::Campus,
        grid: TileGrid::from_rows(&CAMPUS_ROWS, TILE_SIZE)?,
        portals: vec![
            // Main gate, down into the underpass
            portal(
                Aabb::new(208.0, 624.0, 96.0, 16.0),
                Direction::Down,
                MapId::Tunnel,
                Vec2::new(154.0, 48.0),
                Direction::Down,
            ),
            // Library front door
            portal(
                Aabb::new(224.0, 176.0, 16.0, 16.0),
                Direction::Up,
                MapId::Library,
                Vec2::new(114.0, 160.0),
                Direction::Up,
            ),
            // Dome archway
            portal(
                Aabb::new(176.0, 64.0, 48.0, 16.0),
                Direction::Up,
                MapId::InteriorRoom,
                Vec2::new(122.0, 216.0),
                Direction::Up,
            ),
        ],
        npcs: campus_npcs(),
        pitch: Some(PitchLayout {
            field: Aabb::new(116.0, 356.0, 248.0, 56.0),
            left_goal: Vec2::new(116.0, 384.0),
            right_goal: Vec2::new(348.0, 384.0),
        }),
        readables: Vec::new(),
        // On the path east of the pitch
        items: vec![ItemPickup {
            kind: ItemKind::Skateboard,
            area: Aabb::new(388.0, 324.0, 12.0, 12.0),
        }],
    })
}

fn tunnel() -> Result<MapDefinition, WorldError> {
    Ok(MapDefinition {
        id: MapId::Tunnel,
        grid: TileGrid::from_rows(&TUNNEL_ROWS, TILE_SIZE)?,
        portals: vec![portal(
            Aabb::new(112.0, 0.0, 96.0, 16.0),
            Direction::Up,
            MapId::Campus,
            Vec2::new(250.0, 580.0),
            Direction::Up,
        )],
        npcs: Vec::new(),
        pitch: None,
        // Corridor just above the construction barrier
        readables: vec![Readable {
            reach: Aabb::new(96.0, 384.0, 128.0, 48.0),
            title: "Sign".to_string(),
            lines: vec!["To be continued. This passage is under construction.".to_string()],
        }],
        items: Vec::new(),
    })
}

fn library() -> Result<MapDefinition, WorldError> {
    Ok(MapDefinition {
        id: MapId::Library,
        grid: TileGrid::from_rows(&LIBRARY_ROWS, TILE_SIZE)?,
        portals: vec![portal(
            Aabb::new(112.0, 176.0, 16.0, 16.0),
            Direction::Down,
            MapId::Campus,
            Vec2::new(226.0, 194.0),
            Direction::Down,
        )],
        npcs: Vec::new(),
        pitch: None,
        readables: BOOKSHELVES.iter().map(bookshelf).collect(),
        items: Vec::new(),
    })
}

fn interior_room() -> Result<MapDefinition, WorldError> {
    Ok(MapDefinition {
        id: MapId::InteriorRoom,
        grid: TileGrid::from_rows(&INTERIOR_ROWS, TILE_SIZE)?,
        portals: vec![portal(
            Aabb::new(112.0, 240.0, 32.0, 16.0),
            Direction::Down,
            MapId::Campus,
            Vec2::new(184.0, 82.0),
            Direction::Down,
        )],
        npcs: Vec::new(),
        pitch: None,
        readables: Vec::new(),
        items: Vec::new(),
    })
}

/// Load and validate the built-in world
pub fn builtin_atlas() -> Result<WorldAtlas, WorldError> {
    let (col, row) = PLAYER_START_TILE;
    WorldAtlas::new(
        vec![campus()?, tunnel()?, library()?, interior_room()?],
        SpawnPoint {
            map: MapId::Campus,
            position: tile(col, row),
            facing: Direction::Up,
        },
    )
}
