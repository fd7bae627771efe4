use super::Segment;

pub(super) fn segments() -> Vec<Segment> {
    vec![
        Segment::new(
            "departure",
            "00:00",
            0,
            "The last train leaves the station with one passenger and no timetable.",
        ),
        Segment::new(
            "tunnel",
            "00:05",
            5_000,
            "In the tunnel the windows turn to mirrors, and the passenger sees a younger face.",
        ),
        Segment::new(
            "crossing",
            "00:10",
            10_000,
            "A bridge over a sea that was not on any map. The conductor hums an old song.",
        ),
        Segment::new(
            "signal",
            "00:15",
            15_000,
            "Lights on the far shore blink in the rhythm of a remembered voice.",
        ),
        Segment::new(
            "arrival",
            "00:20",
            20_000,
            "The doors open onto a platform that has been waiting all along.",
        ),
    ]
}
